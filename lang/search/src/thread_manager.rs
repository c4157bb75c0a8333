use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::trace;

/// Runs the same job on a number of worker threads.
///
/// Workers share their work through some external queue. A worker which runs out of work calls
/// [Worker::wait_for_update] and is woken up either when another worker made progress, or when
/// every worker ran out of work, in which case the round is over. A worker which found what
/// everybody was looking for ends the round for all of them with [Worker::send_permanent_update].
pub struct ThreadManager {
    max_threads: usize,
}

enum Event {
    Idle(usize),
    Progress,
    Finished,
    Exited(usize),
}

struct Channel {
    events: Sender<Event>,
    wake: Receiver<bool>,
}

/// The handle through which a job communicates with the other workers.
pub struct Worker<'t> {
    id: usize,
    channel: Option<Channel>,
    cancelled: &'t AtomicBool,
}

impl ThreadManager {
    pub fn new(max_threads: usize) -> Self {
        ThreadManager { max_threads }
    }

    /// Run `job` on every worker and return once all of them are done.
    ///
    /// With at most one thread the job runs on the calling thread.
    pub fn run<F>(&self, job: F)
    where
        F: Fn(&Worker<'_>) + Sync,
    {
        let cancelled = AtomicBool::new(false);
        if self.max_threads <= 1 {
            job(&Worker { id: 0, channel: None, cancelled: &cancelled });
            return;
        }

        let (events, incoming) = mpsc::channel();
        thread::scope(|scope| {
            let mut wakers = Vec::with_capacity(self.max_threads);
            for id in 0..self.max_threads {
                let (waker, wake) = mpsc::channel();
                wakers.push(waker);
                let channel = Channel { events: events.clone(), wake };
                let job = &job;
                let cancelled = &cancelled;
                scope.spawn(move || {
                    let worker = Worker { id, channel: Some(channel), cancelled };
                    job(&worker);
                });
            }
            drop(events);
            coordinate(incoming, &wakers, &cancelled);
        });
    }
}

/// Answers the workers until all of them are gone.
fn coordinate(incoming: Receiver<Event>, wakers: &[Sender<bool>], cancelled: &AtomicBool) {
    let n = wakers.len();
    let mut idle = vec![false; n];
    let mut gone = vec![false; n];
    let mut exhausted = false;

    let release = |idle: &mut [bool], answer: bool| {
        for (id, waiting) in idle.iter_mut().enumerate() {
            if *waiting {
                *waiting = false;
                let _ = wakers[id].send(answer);
            }
        }
    };

    for event in incoming {
        match event {
            Event::Idle(id) => {
                if exhausted || cancelled.load(Ordering::SeqCst) {
                    let _ = wakers[id].send(false);
                    continue;
                }
                idle[id] = true;
            }
            Event::Progress => release(&mut idle, true),
            Event::Finished => release(&mut idle, false),
            Event::Exited(id) => gone[id] = true,
        }

        if !exhausted && (0..n).all(|id| idle[id] || gone[id]) {
            trace!("all workers are out of work");
            exhausted = true;
            release(&mut idle, false);
        }
    }
}

impl Worker<'_> {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether some worker ended the round for everyone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Block until there is news from the other workers.
    ///
    /// Returns `true` if another worker made progress, and `false` if the round is over.
    pub fn wait_for_update(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let Some(channel) = &self.channel else {
            return false;
        };
        if channel.events.send(Event::Idle(self.id)).is_err() {
            return false;
        }
        channel.wake.recv().unwrap_or(false)
    }

    /// Wake up the workers waiting for new work.
    pub fn send_update(&self) {
        if let Some(channel) = &self.channel {
            let _ = channel.events.send(Event::Progress);
        }
    }

    /// End the round for every worker.
    pub fn send_permanent_update(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(channel) = &self.channel {
            let _ = channel.events.send(Event::Finished);
        }
    }
}

impl Drop for Worker<'_> {
    fn drop(&mut self) {
        if let Some(channel) = &self.channel {
            let _ = channel.events.send(Event::Exited(self.id));
        }
    }
}
