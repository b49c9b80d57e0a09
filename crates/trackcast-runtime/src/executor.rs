//! Effect Executor
//!
//! Turns effects into collaborator calls. Synchronous calls complete before the
//! next effect is looked at; asynchronous ones are spawned and their results
//! re-enter the session queue as outcomes.

use std::sync::Arc;
use tracing::{debug, trace, warn};
use trackcast_core::{
    Effect, LocationSource, Outcome, RouteProvider, SessionQueue, Transport,
};

/// Executes effects against the session's collaborators
pub struct EffectExecutor {
    transport: Arc<dyn Transport>,
    location_source: Arc<dyn LocationSource>,
    route_provider: Arc<dyn RouteProvider>,
    queue: SessionQueue,
}

impl EffectExecutor {
    pub fn new(
        transport: Arc<dyn Transport>,
        location_source: Arc<dyn LocationSource>,
        route_provider: Arc<dyn RouteProvider>,
        queue: SessionQueue,
    ) -> Self {
        Self {
            transport,
            location_source,
            route_provider,
            queue,
        }
    }

    pub fn execute(&self, effect: Effect) {
        trace!(?effect, "Executing effect");
        match effect {
            Effect::Connect {
                trackable,
                presence_data,
            } => {
                let transport = self.transport.clone();
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let result = transport.connect(&trackable.id, presence_data).await;
                    report(&queue, Outcome::ConnectFinished { trackable, result });
                });
            }
            Effect::SubscribeForPresenceMessages { trackable_id } => {
                if let Err(e) = self.transport.subscribe_for_presence_messages(&trackable_id) {
                    warn!(trackable_id = %trackable_id, "Presence subscription failed: {}", e);
                }
            }
            Effect::SubscribeForChannelState { trackable_id } => {
                if let Err(e) = self.transport.subscribe_for_channel_state(&trackable_id) {
                    warn!(trackable_id = %trackable_id, "Channel state subscription failed: {}", e);
                }
            }
            Effect::Disconnect {
                trackable,
                presence_data,
                completion,
            } => {
                let transport = self.transport.clone();
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let result = transport.disconnect(&trackable.id, presence_data).await;
                    report(
                        &queue,
                        Outcome::DisconnectFinished {
                            trackable,
                            result,
                            completion,
                        },
                    );
                });
            }
            Effect::SendEnhancedLocation {
                trackable_id,
                generation,
                update,
            } => {
                let transport = self.transport.clone();
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let result = transport.send_enhanced_location(&trackable_id, update).await;
                    report(
                        &queue,
                        Outcome::EnhancedSendFinished {
                            trackable_id,
                            generation,
                            result,
                        },
                    );
                });
            }
            Effect::SendRawLocation {
                trackable_id,
                generation,
                update,
            } => {
                let transport = self.transport.clone();
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let result = transport.send_raw_location(&trackable_id, update).await;
                    report(
                        &queue,
                        Outcome::RawSendFinished {
                            trackable_id,
                            generation,
                            result,
                        },
                    );
                });
            }
            Effect::UpdatePresenceData {
                trackable_id,
                presence_data,
            } => {
                let transport = self.transport.clone();
                tokio::spawn(async move {
                    if let Err(e) = transport
                        .update_presence_data(&trackable_id, presence_data)
                        .await
                    {
                        warn!(trackable_id = %trackable_id, "Presence data update failed: {}", e);
                    }
                });
            }
            Effect::Close { presence_data } => {
                let transport = self.transport.clone();
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let result = transport.close(presence_data).await;
                    report(&queue, Outcome::CloseFinished { result });
                });
            }
            Effect::StartUpdatingLocation => self.location_source.start_updating(),
            Effect::StopUpdatingLocation => self.location_source.stop_updating(),
            Effect::StartRecordingLocation => self.location_source.start_recording(),
            Effect::StopRecordingLocation => {
                let location_source = self.location_source.clone();
                tokio::spawn(async move {
                    if let Err(e) = location_source.stop_recording().await {
                        warn!("Stopping location recording failed: {}", e);
                    }
                });
            }
            Effect::ChangeEngineResolution { resolution } => {
                self.location_source.change_resolution(&resolution)
            }
            Effect::FetchRoute {
                trackable_id,
                destination,
                profile,
                completion,
            } => {
                let route_provider = self.route_provider.clone();
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let result = route_provider.get_route(destination, profile).await;
                    report(
                        &queue,
                        Outcome::RouteFetched {
                            trackable_id,
                            profile,
                            result,
                            completion,
                        },
                    );
                });
            }
            Effect::Followup(outcome) => report(&self.queue, outcome),
        }
    }
}

fn report(queue: &SessionQueue, outcome: Outcome) {
    if let Err(e) = queue.enqueue(outcome) {
        debug!("Dropping outcome, publisher is gone: {}", e);
    }
}
