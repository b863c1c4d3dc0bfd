use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::errors::EstimationError;

use super::{ErrorPayload, EstimationResponse, EstimationService};

/// Work item handed to a pool thread
enum PoolCommand {
    /// Estimate one raw request body and send the answer back tagged with its position
    Estimate {
        index: usize,
        body: String,
        reply: Sender<(usize, EstimationResponse)>,
    },
    /// Stop the receiving worker
    Shutdown,
}

/// 요청 일괄 처리용 워커 풀
///
/// Every worker shares the same read-only service, so requests are
/// independent and may complete in any order.
pub struct EstimationPool {
    command_tx: Sender<PoolCommand>,
    handles: Vec<JoinHandle<()>>,
}

impl EstimationPool {
    pub fn new(service: Arc<EstimationService>, workers: usize) -> Self {
        let workers = workers.max(1);
        let (command_tx, command_rx) = unbounded();

        let handles = (0..workers)
            .map(|id| {
                let service = Arc::clone(&service);
                let command_rx: Receiver<PoolCommand> = command_rx.clone();
                thread::spawn(move || worker_loop(id, &service, &command_rx))
            })
            .collect();

        debug!("Estimation pool started with {} worker(s)", workers);
        Self { command_tx, handles }
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Estimate every body and return the responses in input order.
    ///
    /// A body that fails, or that no worker answered, gets its own error
    /// payload; the rest of the batch is unaffected.
    pub fn estimate_batch(&self, bodies: Vec<String>) -> Vec<EstimationResponse> {
        let n = bodies.len();
        let (reply_tx, reply_rx) = unbounded();

        for (index, body) in bodies.into_iter().enumerate() {
            let command = PoolCommand::Estimate {
                index,
                body,
                reply: reply_tx.clone(),
            };
            if self.command_tx.send(command).is_err() {
                warn!("Estimation pool is closed, request {} dropped", index);
            }
        }
        drop(reply_tx);

        let mut slots: Vec<Option<EstimationResponse>> = vec![None; n];
        for (index, response) in reply_rx.iter() {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(response);
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    EstimationResponse::Failure(ErrorPayload::from(&EstimationError::Prediction(
                        "request was not processed".to_string(),
                    )))
                })
            })
            .collect()
    }
}

impl Drop for EstimationPool {
    fn drop(&mut self) {
        for _ in 0..self.handles.len() {
            let _ = self.command_tx.send(PoolCommand::Shutdown);
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Estimation worker terminated abnormally");
            }
        }
    }
}

fn worker_loop(id: usize, service: &EstimationService, commands: &Receiver<PoolCommand>) {
    for command in commands.iter() {
        match command {
            PoolCommand::Estimate { index, body, reply } => {
                let response = service.respond_text(&body);
                let _ = reply.send((index, response));
            }
            PoolCommand::Shutdown => break,
        }
    }
    debug!("Estimation worker {} stopped", id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(workers: usize) -> EstimationPool {
        EstimationPool::new(Arc::new(EstimationService::heuristic()), workers)
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let pool = pool(4);
        let bodies: Vec<String> = (1..=50)
            .map(|i| format!("{{\"area\": {}}}", 1000 + i * 10))
            .collect();

        let responses = pool.estimate_batch(bodies);

        assert_eq!(responses.len(), 50);
        for (i, response) in responses.iter().enumerate() {
            match response {
                EstimationResponse::Success(result) => {
                    assert_eq!(result.features_used.gr_liv_area, (1000 + (i + 1) * 10) as f64)
                }
                other => panic!("unexpected response: {other:?}"),
            }
        }
    }

    #[test]
    fn test_bad_request_does_not_affect_others() {
        let pool = pool(2);
        let responses = pool.estimate_batch(vec![
            "{\"area\": 2000}".to_string(),
            "not json".to_string(),
            String::new(),
            "{}".to_string(),
        ]);

        assert!(responses[0].is_success());
        assert!(!responses[1].is_success());
        assert!(!responses[2].is_success());
        assert!(responses[3].is_success());
    }

    #[test]
    fn test_empty_batch_and_worker_floor() {
        let pool = pool(0);
        assert_eq!(pool.workers(), 1);
        assert!(pool.estimate_batch(Vec::new()).is_empty());
    }
}
