use std::any::Any;
use std::collections::HashMap;
use crossbeam_channel::{Receiver, TryRecvError};
use uuid::Uuid;
use crate::background_process::background_process_handler::BackgroundProcessHandler;
use crate::background_process::run_in_background::RunInBackground;
use crate::background_process::signal::Signal;
use crate::background_process::task_context::TaskContext;

/// Runs every task on its own thread and keeps the listeners on the owner's side.
/// The owner pumps [BackgroundProcessRegistry::handle_events_from_background] to
/// deliver signals; a process is forgotten once its `Complete` signal is delivered.
#[derive(Default)]
pub struct BackgroundProcessRegistry {
    processes: HashMap<Uuid, Box<dyn HandleSignals>>,
}

trait HandleSignals: Any {
    fn handle_signals(&mut self, id: &Uuid) -> bool;
}

impl BackgroundProcessRegistry {
    pub fn new() -> Self {
        BackgroundProcessRegistry::default()
    }

    /// Delivers pending signals. Returns the number of processes that finished.
    pub fn handle_events_from_background(&mut self) -> usize {
        let mut finished_ids = vec![];
        for (id, b) in self.processes.iter_mut() {
            let finished = b.handle_signals(id);
            if finished {
                finished_ids.push(*id);
            }
        }
        for id in &finished_ids {
            self.unregister(id);
        }
        finished_ids.len()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    fn register<M, R, L>(&mut self, id: Uuid, bgp: BackgroundProcessData<M, R, L>)
    where
        M: Send + 'static,
        R: Send + 'static,
        L: FnMut(Signal<M, R>, &Uuid) + 'static,
    {
        self.processes.insert(id, Box::new(bgp));
    }

    fn unregister(&mut self, id: &Uuid) {
        log::debug!("Background process {} finished", id);
        self.processes.remove(id);
    }
}

impl RunInBackground for BackgroundProcessRegistry {
    fn run_in_background<T1, T2, M, T, R, L>(
        &mut self,
        title: T1,
        description: T2,
        task: T,
        listener: L,
    ) -> BackgroundProcessHandler
    where
        T1: ToString,
        T2: ToString,
        M: Send + 'static,
        R: Send + 'static,
        T: FnOnce(&mut TaskContext<M, R>) -> R,
        T: Send + 'static,
        L: FnMut(Signal<M, R>, &Uuid) + 'static,
    {
        let id = Uuid::new_v4();
        let title = title.to_string();
        let (sender, receiver) = crossbeam_channel::unbounded();
        let (sender_interrupt, receiver_interrupt) = crossbeam_channel::unbounded();
        let bgd = BackgroundProcessData::new(receiver, listener);
        self.register(id, bgd);

        log::info!("Starting background process {} ({})", id, title);
        std::thread::spawn(move || {
            let mut task_context = TaskContext::new(sender.clone(), receiver_interrupt, id);
            let result = task(&mut task_context);
            if sender.send(Signal::Complete(result)).is_err() {
                log::warn!("Result of background process {} has nobody to receive it", id);
            }
        });

        BackgroundProcessHandler::new(sender_interrupt, id, title, description.to_string())
    }
}

pub struct BackgroundProcessData<M, R, L>
where
    M: Send + 'static,
    R: Send + 'static,
    L: FnMut(Signal<M, R>, &Uuid) + 'static,
{
    receiver: Receiver<Signal<M, R>>,
    listener: L,
}

impl<M, R, L> BackgroundProcessData<M, R, L>
where
    M: Send + 'static,
    R: Send + 'static,
    L: FnMut(Signal<M, R>, &Uuid) + 'static,
{
    pub fn new(receiver: Receiver<Signal<M, R>>, listener: L) -> Self {
        BackgroundProcessData { receiver, listener }
    }
}

impl<M, R, L> HandleSignals for BackgroundProcessData<M, R, L>
where
    M: Send + 'static,
    R: Send + 'static,
    L: FnMut(Signal<M, R>, &Uuid) + 'static,
{
    fn handle_signals(&mut self, id: &Uuid) -> bool {
        let listener = &mut self.listener;
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => {
                    let complete = signal.is_complete();
                    listener(signal, id);
                    if complete {
                        return true;
                    }
                }
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => {
                    // task thread died without sending Complete
                    log::error!("Background process {} terminated abnormally", id);
                    return true;
                }
            }
        }
    }
}
