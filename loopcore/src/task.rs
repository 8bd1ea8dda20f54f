//! Running a build off the calling thread.
//!
//! Building large loops can take a while (values with thousands of digits), so
//! interactive callers dispatch the work to a worker thread and poll for the
//! result. The computation itself has no cancellation point: dropping a
//! [`BuildTask`] abandons the result while the worker runs to completion.
use std::{thread, time::Duration};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};
use log::{debug, warn};
use num_bigint::BigInt;

use crate::{
    cycle::Loop,
    limits::Limits,
    segments::SegmentList,
    utils::{Error, Result},
};

/// Handle on a build running on a worker thread.
pub struct BuildTask<T = Loop> {
    receiver: Receiver<Result<T>>,
    result: Option<Result<T>>,
}

impl BuildTask<Loop> {
    /// Builds the loop for `multiplier` and `segments` on a worker thread.
    pub fn spawn(multiplier: BigInt, segments: SegmentList, limits: Limits) -> Self {
        Self::spawn_with(move || Loop::build_with(&multiplier, &segments, &limits))
    }
}

impl<T: Send + 'static> BuildTask<T> {
    /// Runs `job` on a worker thread.
    pub fn spawn_with<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (sender, receiver) = channel::bounded(1);
        thread::spawn(move || {
            if sender.send(job()).is_err() {
                debug!("Build finished after its task handle was dropped");
            }
        });

        Self {
            receiver,
            result: None,
        }
    }
}

impl<T> BuildTask<T> {
    fn receive(&mut self, outcome: std::result::Result<Result<T>, ()>) {
        self.result = Some(outcome.unwrap_or_else(|()| {
            warn!("Build worker exited without a result");
            Err(Error::BuildAborted)
        }));
    }

    /// Returns `true` once the result is available.
    pub fn is_finished(&mut self) -> bool {
        if self.result.is_none() {
            match self.receiver.try_recv() {
                Ok(result) => self.receive(Ok(result)),
                Err(TryRecvError::Disconnected) => self.receive(Err(())),
                Err(TryRecvError::Empty) => {}
            }
        }
        self.result.is_some()
    }

    /// Takes the result if the build is done, without blocking.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        if self.is_finished() {
            self.result.take()
        } else {
            None
        }
    }

    /// Waits at most `timeout` for the result.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<T>> {
        if self.result.is_none() {
            match self.receiver.recv_timeout(timeout) {
                Ok(result) => self.receive(Ok(result)),
                Err(RecvTimeoutError::Disconnected) => self.receive(Err(())),
                Err(RecvTimeoutError::Timeout) => return None,
            }
        }
        self.result.take()
    }

    /// Blocks until the result is available.
    pub fn wait(mut self) -> Result<T> {
        match self.result.take() {
            Some(result) => result,
            None => self.receiver.recv().unwrap_or(Err(Error::BuildAborted)),
        }
    }
}
