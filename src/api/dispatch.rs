use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::{ApiEvent, ApiRequest, CustomerClient};

/// Runs queued requests on a tokio runtime and hands completions back to the UI thread.
///
/// Requests are independent tasks: nothing orders or cancels them, so two
/// mutations issued back to back race freely. Every request yields exactly
/// one event, which keeps `in_flight` exact.
pub struct Dispatcher {
    client: Arc<CustomerClient>,
    handle: Handle,
    tx: UnboundedSender<ApiEvent>,
    rx: UnboundedReceiver<ApiEvent>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(client: CustomerClient, handle: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            client: Arc::new(client),
            handle,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, request: ApiRequest) {
        tracing::debug!(kind = request.kind().label(), id = ?request.target_id(), "dispatch request");
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.handle.spawn(async move {
            let event = execute(&client, request).await;
            // Receiver gone means the UI has shut down.
            let _ = tx.send(event);
        });
    }

    /// Next completed request, without blocking.
    pub fn try_next(&mut self) -> Option<ApiEvent> {
        let event = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Wait for the next completed request.
    pub async fn next_event(&mut self) -> Option<ApiEvent> {
        let event = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Perform one request against the backend and describe the outcome.
pub async fn execute(client: &CustomerClient, request: ApiRequest) -> ApiEvent {
    let kind = request.kind();
    let id = request.target_id();
    let outcome = match request {
        ApiRequest::List { seq } => client
            .list()
            .await
            .map(|customers| ApiEvent::Listed { seq, customers }),
        ApiRequest::Create(customer) => client
            .create(&customer)
            .await
            .map(|_| ApiEvent::Created { id: customer.id }),
        ApiRequest::Update { id, fields } => client
            .update(id, &fields)
            .await
            .map(|_| ApiEvent::Updated { id }),
        ApiRequest::Delete { id } => client.delete(id).await.map(|_| ApiEvent::Deleted { id }),
    };
    outcome.unwrap_or_else(|e| {
        tracing::warn!(kind = kind.label(), id = ?id, error = %e, "request failed");
        ApiEvent::Failed {
            kind,
            id,
            error: e.to_string(),
        }
    })
}
