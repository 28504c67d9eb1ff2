// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crossbeam_channel::{unbounded, Sender};
use selenium_core::renderer::{GpuTimeline, RenderError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Work = Box<dyn FnOnce() + Send + 'static>;

enum QueueCommand {
    Execute(Work),
    Signal(u64),
    Shutdown,
}

#[derive(Debug, Default)]
struct QueueState {
    completed: u64,
    paused: bool,
    lost: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<QueueState>,
    changed: Condvar,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A simulated GPU command queue.
///
/// Submitted work runs in order on a dedicated thread, each batch taking at
/// least `latency`. Fence signals are processed in the same order, so a
/// signalled value completes only once all work submitted before it has run.
/// It implements [`GpuTimeline`] for the frame ring.
pub struct HostQueue {
    sender: Sender<QueueCommand>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl HostQueue {
    /// Starts the queue thread.
    pub fn new(latency: Duration) -> Self {
        let (sender, receiver) = unbounded::<QueueCommand>();
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);

        let worker = thread::Builder::new()
            .name("selenium-gpu".to_string())
            .spawn(move || {
                for command in receiver.iter() {
                    // A paused GPU holds every command until resumed.
                    {
                        let state = worker_shared.state();
                        let state = worker_shared
                            .changed
                            .wait_while(state, |s| s.paused && !s.lost)
                            .unwrap_or_else(PoisonError::into_inner);
                        if state.lost {
                            break;
                        }
                    }

                    match command {
                        QueueCommand::Execute(work) => {
                            if !latency.is_zero() {
                                thread::sleep(latency);
                            }
                            if catch_unwind(AssertUnwindSafe(work)).is_err() {
                                log::error!("HostQueue: Submitted work panicked, device lost");
                                worker_shared.state().lost = true;
                                worker_shared.changed.notify_all();
                                break;
                            }
                        }
                        QueueCommand::Signal(value) => {
                            let mut state = worker_shared.state();
                            state.completed = state.completed.max(value);
                            drop(state);
                            worker_shared.changed.notify_all();
                        }
                        QueueCommand::Shutdown => break,
                    }
                }
                log::debug!("HostQueue: Worker thread exiting");
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("HostQueue: Failed to spawn worker thread: {e}");
                shared.state().lost = true;
                None
            }
        };

        Self {
            sender,
            shared,
            worker,
        }
    }

    /// Queues `work` to run after everything submitted before it.
    pub fn submit<F>(&self, work: F) -> Result<(), RenderError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.send(QueueCommand::Execute(Box::new(work)))
    }

    /// Stops processing commands until [`resume`](Self::resume) is called.
    pub fn pause(&self) {
        self.shared.state().paused = true;
        self.shared.changed.notify_all();
    }

    /// Resumes a paused queue.
    pub fn resume(&self) {
        self.shared.state().paused = false;
        self.shared.changed.notify_all();
    }

    /// Whether the queue stopped because submitted work failed.
    pub fn is_lost(&self) -> bool {
        self.shared.state().lost
    }

    fn send(&self, command: QueueCommand) -> Result<(), RenderError> {
        if self.is_lost() {
            return Err(RenderError::DeviceLost);
        }
        self.sender
            .send(command)
            .map_err(|_| RenderError::DeviceLost)
    }
}

impl GpuTimeline for HostQueue {
    fn signal(&self, value: u64) -> Result<(), RenderError> {
        self.send(QueueCommand::Signal(value))
    }

    fn completed_value(&self) -> u64 {
        self.shared.state().completed
    }

    fn wait_for_value(&self, value: u64, timeout: Option<Duration>) -> Result<bool, RenderError> {
        let state = self.shared.state();
        let pending = |s: &mut QueueState| s.completed < value && !s.lost;

        let state = match timeout {
            None => self
                .shared
                .changed
                .wait_while(state, pending)
                .unwrap_or_else(PoisonError::into_inner),
            Some(timeout) => {
                self.shared
                    .changed
                    .wait_timeout_while(state, timeout, pending)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        };

        if state.completed >= value {
            Ok(true)
        } else if state.lost {
            Err(RenderError::DeviceLost)
        } else {
            Ok(false)
        }
    }
}

impl Drop for HostQueue {
    fn drop(&mut self) {
        let _ = self.sender.send(QueueCommand::Shutdown);
        self.resume();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("HostQueue: Worker thread panicked during shutdown");
            }
        }
    }
}

impl std::fmt::Debug for HostQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostQueue")
            .field("state", &*self.shared.state())
            .finish()
    }
}
