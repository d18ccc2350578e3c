//! Fakes shared by the command tests.

use crate::{port::Probe, process::Terminate, PortReport, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

/// A probe answering from a fixed table of busy ports; everything else is
/// free. Records every port it was asked about.
pub(crate) struct FakeProbe {
    busy: HashMap<u16, Option<u32>>,
    checked: Mutex<Vec<u16>>,
}

impl FakeProbe {
    pub(crate) fn all_free() -> Self {
        Self::busy(&[])
    }

    pub(crate) fn busy(ports: &[(u16, Option<u32>)]) -> Self {
        Self {
            busy: ports.iter().copied().collect(),
            checked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn checked(&self) -> Vec<u16> {
        self.checked.lock().unwrap().clone()
    }
}

impl Probe for FakeProbe {
    fn check(&self, port: u16) -> impl Future<Output = PortReport> + Send {
        self.checked.lock().unwrap().push(port);
        let report = match self.busy.get(&port) {
            Some(Some(pid)) => PortReport::in_use(port).with_process(*pid, "fake"),
            Some(None) => PortReport::in_use(port).with_message("Unable to find PID"),
            None => PortReport::free(port),
        };
        async move { report }
    }
}

/// Records the PIDs it was asked to terminate.
pub(crate) struct FakeTerminator {
    outcome: std::result::Result<(), crate::Error>,
    killed: Mutex<Vec<u32>>,
}

impl FakeTerminator {
    pub(crate) fn succeeding() -> Self {
        Self {
            outcome: Ok(()),
            killed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: crate::Error) -> Self {
        Self {
            outcome: Err(error),
            killed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn killed(&self) -> Vec<u32> {
        self.killed.lock().unwrap().clone()
    }
}

impl Terminate for FakeTerminator {
    fn terminate(&self, pid: u32) -> impl Future<Output = Result<()>> + Send {
        self.killed.lock().unwrap().push(pid);
        let outcome = self.outcome.clone();
        async move { outcome }
    }
}
