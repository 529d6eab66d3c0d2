//! Subscription as a stream of events.

use futures::Stream;
use futures::stream;

use dashx_entity::event::{Event, EventAction};

use crate::registry::{CAUSE_LOGGED_OUT, Subscription};

/// Yield events from `subscription` in publish order.
///
/// A `CHANNEL_CLOSED` event is yielded and then ends the stream, recording
/// the logout cause. Dropping the stream early drops the subscription,
/// which unsubscribes it as a disconnect.
pub fn subscription_stream(subscription: Subscription) -> impl Stream<Item = Event> + Send {
    stream::unfold(Some(subscription), |state| async move {
        let mut subscription = state?;
        let event = subscription.recv().await?;

        if event.action() == EventAction::ChannelClosed {
            subscription.set_cause(CAUSE_LOGGED_OUT);
            return Some((event, None));
        }
        Some((event, Some(subscription)))
    })
}
