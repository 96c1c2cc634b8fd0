use crate::core::{Sampler, Subscription};
use crate::models::RawSample;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<u64, UnboundedSender<RawSample>>,
}

/// In-process position stream. Device reports are pushed in with
/// [`FanoutSampler::publish`] and copied to every live subscriber.
#[derive(Clone, Default)]
pub(crate) struct FanoutSampler {
    registry: Arc<Mutex<Registry>>,
}

impl FanoutSampler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns how many subscribers the sample was queued for.
    pub(crate) fn publish(&self, sample: RawSample) -> usize {
        let mut registry = self.registry.lock();
        registry
            .subscribers
            .retain(|_, tx| tx.send(sample.clone()).is_ok());
        registry.subscribers.len()
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

impl Sampler for FanoutSampler {
    /// Must be called from within a tokio runtime; each subscriber gets its
    /// own delivery task.
    fn subscribe(&self, mut on_sample: Box<dyn FnMut(RawSample) + Send>) -> Subscription {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.subscribers.insert(id, tx);
            id
        };
        let delivery = tokio::spawn(async move {
            while let Some(sample) = rx.recv().await {
                on_sample(sample);
            }
        });
        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().subscribers.remove(&id);
            }
            delivery.abort();
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::timeout;

    fn sample(longitude: f64) -> RawSample {
        RawSample {
            longitude,
            latitude: 0.0,
            timestamp: None,
            accuracy: None,
        }
    }

    fn collect(sampler: &FanoutSampler) -> (Subscription, UnboundedReceiver<f64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = sampler.subscribe(Box::new(move |s: RawSample| {
            let _ = tx.send(s.longitude);
        }));
        (sub, rx)
    }

    async fn next(rx: &mut UnboundedReceiver<f64>) -> Option<f64> {
        timeout(Duration::from_secs(1), rx.recv()).await.ok().flatten()
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_every_sample() {
        let sampler = FanoutSampler::new();
        let (_a, mut rx_a) = collect(&sampler);
        let (_b, mut rx_b) = collect(&sampler);
        for i in 0..5 {
            assert_eq!(sampler.publish(sample(i as f64)), 2);
        }
        for i in 0..5 {
            assert_eq!(next(&mut rx_a).await, Some(i as f64));
            assert_eq!(next(&mut rx_b).await, Some(i as f64));
        }
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let sampler = FanoutSampler::new();
        let (mut a, mut rx_a) = collect(&sampler);
        let (_b, mut rx_b) = collect(&sampler);
        a.unsubscribe();
        a.unsubscribe();
        assert_eq!(sampler.subscriber_count(), 1);
        assert_eq!(sampler.publish(sample(1.0)), 1);
        assert_eq!(next(&mut rx_b).await, Some(1.0));
        // delivery task is gone, so the forwarding sender was dropped
        assert_eq!(next(&mut rx_a).await, None);
    }

    #[tokio::test]
    async fn test_silent_without_publisher() {
        let sampler = FanoutSampler::new();
        let (_sub, mut rx) = collect(&sampler);
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let sampler = FanoutSampler::new();
        assert_eq!(sampler.publish(sample(3.0)), 0);
        let (sub, _rx) = collect(&sampler);
        drop(sub);
        assert_eq!(sampler.subscriber_count(), 0);
    }
}
