use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::info;

use super::{ChatModel, ChatTurn};
use crate::error::LlmError;

/// A request to be queued for LLM processing
struct QueuedRequest {
    system_prompt: String,
    history: Vec<ChatTurn>,
    user_input: String,
    response_tx: oneshot::Sender<Result<String, String>>,
}

/// LLM Queue that bounds pending requests and limits concurrent model calls
#[derive(Clone)]
pub struct LLMQueue {
    tx: mpsc::Sender<QueuedRequest>,
}

impl LLMQueue {
    /// Create a new LLM Queue over `model`; must be called inside a tokio runtime.
    pub fn new(model: Arc<dyn ChatModel>, max_concurrent: usize, queue_size: usize) -> Self {
        let (tx, rx) = mpsc::channel::<QueuedRequest>(queue_size);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        tokio::spawn(Self::process_queue(model, semaphore, rx));

        Self { tx }
    }

    async fn process_queue(
        model: Arc<dyn ChatModel>,
        semaphore: Arc<Semaphore>,
        mut rx: mpsc::Receiver<QueuedRequest>,
    ) {
        info!(
            "📬 [QUEUE] LLM Queue processor started (max concurrent: {})",
            semaphore.available_permits()
        );

        while let Some(request) = rx.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = request
                        .response_tx
                        .send(Err("Semaphore closed".to_string()));
                    continue;
                }
            };

            info!(
                "📬 [QUEUE] Acquired permit. {} slots remaining",
                semaphore.available_permits()
            );

            let model = model.clone();
            tokio::spawn(async move {
                let result = model
                    .generate(&request.system_prompt, &request.history, &request.user_input)
                    .await
                    .map_err(|e| e.to_string());

                let _ = request.response_tx.send(result);
                drop(permit);
            });
        }

        info!("📬 [QUEUE] Channel closed, shutting down");
    }
}

#[async_trait]
impl ChatModel for LLMQueue {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String, LlmError> {
        let (response_tx, response_rx) = oneshot::channel();

        let request = QueuedRequest {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
            user_input: user_input.to_string(),
            response_tx,
        };

        self.tx
            .send(request)
            .await
            .map_err(|_| LlmError::Queue("Failed to queue LLM request".into()))?;

        match response_rx.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(LlmError::Backend(e)),
            Err(_) => Err(LlmError::Queue("LLM request was cancelled".into())),
        }
    }
}
