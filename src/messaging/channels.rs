// Communication channels lock-free

use crate::messaging::beat::BeatEvent;
use crate::messaging::notification::Notification;
use ringbuf::{HeapRb, traits::Split};

pub type BeatProducer = ringbuf::HeapProd<BeatEvent>;
pub type BeatConsumer = ringbuf::HeapCons<BeatEvent>;

pub fn create_beat_channel(capacity: usize) -> (BeatProducer, BeatConsumer) {
    let rb = HeapRb::<BeatEvent>::new(capacity);
    rb.split()
}

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}
