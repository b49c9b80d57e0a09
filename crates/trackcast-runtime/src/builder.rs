//! Publisher Builder API
//!
//! Collects the configuration and collaborators, wires them to a fresh session
//! queue and spawns the publisher task and the foreground dispatcher.

use crate::executor::EffectExecutor;
use crate::foreground::ForegroundDispatcher;
use crate::logic::{PublisherState, PublisherTask};
use crate::publisher::Publisher;
use std::sync::{Arc, Weak};
use tracing::info;
use trackcast_core::channel::{create_foreground_channel, create_message_channel};
use trackcast_core::{
    EventSender, LocationSource, PolicyMethods, PublisherConfig, PublisherDelegate,
    PublisherError, PublisherResult, ResolutionPolicyFactory, RouteProvider, SessionQueue,
    SystemTimeSource, TimeSource, Transport,
};

// ----------------------------------------------------------------------------
// Publisher Builder
// ----------------------------------------------------------------------------

/// Builder for a publisher session
pub struct PublisherBuilder {
    config: PublisherConfig,
    transport: Option<Box<dyn Transport>>,
    location_source: Option<Box<dyn LocationSource>>,
    route_provider: Option<Arc<dyn RouteProvider>>,
    policy_factory: Option<Box<dyn ResolutionPolicyFactory>>,
    delegate: Option<Weak<dyn PublisherDelegate>>,
    time_source: Arc<dyn TimeSource>,
}

impl Default for PublisherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PublisherBuilder {
    pub fn new() -> Self {
        Self {
            config: PublisherConfig::default(),
            transport: None,
            location_source: None,
            route_provider: None,
            policy_factory: None,
            delegate: None,
            time_source: Arc::new(SystemTimeSource),
        }
    }

    pub fn with_config(mut self, config: PublisherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn location_source<L: LocationSource + 'static>(mut self, location_source: L) -> Self {
        self.location_source = Some(Box::new(location_source));
        self
    }

    pub fn route_provider<R: RouteProvider + 'static>(mut self, route_provider: R) -> Self {
        self.route_provider = Some(Arc::new(route_provider));
        self
    }

    pub fn resolution_policy_factory<F: ResolutionPolicyFactory + 'static>(
        mut self,
        factory: F,
    ) -> Self {
        self.policy_factory = Some(Box::new(factory));
        self
    }

    /// Register the delegate without taking ownership of it
    pub fn delegate<D: PublisherDelegate + 'static>(mut self, delegate: &Arc<D>) -> Self {
        let delegate: Arc<dyn PublisherDelegate> = delegate.clone();
        self.delegate = Some(Arc::downgrade(&delegate));
        self
    }

    pub fn time_source<S: TimeSource + 'static>(mut self, time_source: S) -> Self {
        self.time_source = Arc::new(time_source);
        self
    }

    /// Validate, wire and spawn the session
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> PublisherResult<Publisher> {
        self.config.validate()?;
        let mut transport = self
            .transport
            .ok_or_else(|| PublisherError::incomplete("transport"))?;
        let mut location_source = self
            .location_source
            .ok_or_else(|| PublisherError::incomplete("location source"))?;
        let route_provider = self
            .route_provider
            .ok_or_else(|| PublisherError::incomplete("route provider"))?;
        let policy_factory = self
            .policy_factory
            .ok_or_else(|| PublisherError::incomplete("resolution policy factory"))?;

        let (sender, receiver) = create_message_channel();
        let (foreground_sender, foreground_receiver) = create_foreground_channel();
        let queue = SessionQueue::new(&sender);

        transport.attach_events(EventSender::new(queue.clone()));
        location_source.attach_events(EventSender::new(queue.clone()));

        // A constant engine resolution is applied once and never recomputed
        if let Some(resolution) = self.config.resolution.constant_engine_resolution {
            location_source.change_resolution(&resolution);
        }

        let policy = policy_factory.create_policy(PolicyMethods::new(queue.clone()));
        let state = PublisherState::new(self.config, policy, queue.clone(), self.time_source);
        let executor = EffectExecutor::new(
            Arc::from(transport),
            Arc::from(location_source),
            route_provider,
            queue,
        );

        let task = PublisherTask::new(state, receiver, executor, foreground_sender.clone());
        tokio::spawn(task.run());
        tokio::spawn(ForegroundDispatcher::new(foreground_receiver, self.delegate).run());

        info!("Publisher started");
        Ok(Publisher::new(sender, foreground_sender))
    }
}
