//! Configuration loading tests: layer precedence in `precedence`, derived
//! values in `field_resolution`.

mod helpers;
