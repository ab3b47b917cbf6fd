//! A Wiremock GitHub API together with the runtime that drives it.

use std::io;
use std::rc::Rc;

use tokio::runtime::{Builder, Runtime};
use wiremock::{Mock, MockServer};

/// Cheaply cloneable handle so it can live in an `rstest-bdd` slot.
///
/// The runtime is single-threaded like the installer's own. Wiremock serves
/// requests from its own thread, so the server answers while the runtime is
/// blocked on the code under test.
#[derive(Clone)]
pub(crate) struct FakeGitHub {
    runtime: Rc<Runtime>,
    server: Rc<MockServer>,
}

impl FakeGitHub {
    /// Builds the runtime and starts the server.
    pub(crate) fn start() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let server = runtime.block_on(MockServer::start());
        Ok(Self {
            runtime: Rc::new(runtime),
            server: Rc::new(server),
        })
    }

    /// Base URL to hand to the installer as its API base.
    pub(crate) fn uri(&self) -> String {
        self.server.uri()
    }

    pub(crate) fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Number of requests the server has seen so far.
    pub(crate) fn request_count(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .map_or(0, |requests| requests.len())
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
