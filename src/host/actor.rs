//! Actor adapter for [`ToolHost`].
//!
//! Mounts a host inside an acton-reactive actor so the agent-facing
//! primitives are reachable as messages. Replies are broadcast on the
//! actor broker; subscribe to [`ToolResultReady`], [`OutgoingMessages`],
//! [`CapabilityList`], and [`ToolRequestRejected`] to receive them.
//!
//! Tool requests are accepted in mailbox order and their handlers run on
//! separate tasks, so a slow handler never holds up the mailbox. Result
//! fetches wait on separate tasks too; a parked fetch neither delays later
//! messages nor holds up runtime shutdown.

use crate::host::ToolHost;
use crate::tools::{ToolRequest, ToolResult};
use crate::types::{CapabilityName, CorrelationId};
use acton_reactive::prelude::*;
use serde_json::Value;

/// Message to mount the host in the actor.
#[acton_message]
pub struct InitToolHost {
    /// The host to serve
    pub host: ToolHost,
}

/// A message from the agent for the host's business logic.
#[acton_message]
pub struct DeliverAgentMessage {
    /// The structured agent message
    pub message: Value,
}

/// A tool invocation request from the agent.
#[acton_message]
pub struct RequestToolExecution {
    /// The request to run
    pub request: ToolRequest,
}

/// A raw line the business logic wants delivered to the agent.
#[acton_message]
pub struct SendToAgent {
    /// The line to deliver
    pub message: String,
}

/// Asks the actor to drain the outbound queue.
///
/// Answered with [`OutgoingMessages`].
#[acton_message]
pub struct FetchOutgoingMessages;

/// Asks the actor for a tool result, waiting until it is stored.
///
/// Answered with [`ToolResultReady`].
#[acton_message]
pub struct FetchToolResult {
    /// The request whose result to fetch
    pub correlation_id: CorrelationId,
}

/// Asks the actor which capabilities it serves.
///
/// Answered with [`CapabilityList`].
#[acton_message]
pub struct ListCapabilities;

/// Broadcast with the drained outbound queue.
#[acton_message]
pub struct OutgoingMessages {
    /// Name of the host that drained them
    pub host: String,
    /// Messages in enqueue order; may be empty
    pub messages: Vec<String>,
}

/// Broadcast when a fetched tool result is available.
#[acton_message]
pub struct ToolResultReady {
    /// The consumed result
    pub result: ToolResult,
}

/// Broadcast with the registered capabilities.
#[acton_message]
pub struct CapabilityList {
    /// Name of the answering host
    pub host: String,
    /// Every registered capability, sorted
    pub capabilities: Vec<CapabilityName>,
    /// Capabilities the agent should route to the host, sorted
    pub intercepted: Vec<CapabilityName>,
}

/// Broadcast when a tool request could not be accepted.
#[acton_message]
pub struct ToolRequestRejected {
    /// The refused request's id
    pub correlation_id: CorrelationId,
    /// Why it was refused
    pub reason: String,
}

/// Actor state wrapping a mounted [`ToolHost`].
#[acton_actor]
pub struct ToolHostActor {
    /// The mounted host; None until `InitToolHost` is handled
    pub host: Option<ToolHost>,
}

impl ToolHostActor {
    /// Spawns the actor and mounts `host` in it.
    ///
    /// The actor is named after the host.
    pub async fn spawn(runtime: &mut ActorRuntime, host: ToolHost) -> ActorHandle {
        let mut builder = runtime.new_actor_with_name::<ToolHostActor>(host.name().to_string());

        builder
            .before_start(|_actor| {
                tracing::debug!("Tool host actor initializing");
                Reply::ready()
            })
            .after_start(|_actor| {
                tracing::debug!("Tool host actor started");
                Reply::ready()
            })
            .before_stop(|actor| {
                if let Some(ref host) = actor.model.host {
                    let metrics = host.metrics();
                    tracing::info!(
                        host = %host.name(),
                        in_flight = host.in_flight(),
                        accepted = metrics.accepted,
                        consumed = metrics.consumed,
                        "Tool host actor shutting down"
                    );
                }
                Reply::ready()
            });

        configure_handlers(&mut builder);

        let handle = builder.start().await;

        handle.send(InitToolHost { host }).await;

        handle
    }
}

/// Configures message handlers for the tool host actor.
fn configure_handlers(builder: &mut ManagedActor<Idle, ToolHostActor>) {
    builder.mutate_on::<InitToolHost>(|actor, envelope| {
        let host = envelope.message().host.clone();
        tracing::info!(
            host = %host.name(),
            capabilities = host.registry().len(),
            "Tool host mounted"
        );
        actor.model.host = Some(host);
        Reply::ready()
    });

    builder.act_on::<DeliverAgentMessage>(|actor, envelope| {
        match actor.model.host {
            Some(ref host) => host.deliver_agent_message(envelope.message().message.clone()),
            None => tracing::warn!("Agent message dropped; no tool host mounted"),
        }
        Reply::ready()
    });

    builder.act_on::<SendToAgent>(|actor, envelope| {
        match actor.model.host {
            Some(ref host) => host.send_to_agent(envelope.message().message.clone()),
            None => tracing::warn!("Outbound message dropped; no tool host mounted"),
        }
        Reply::ready()
    });

    builder.act_on::<RequestToolExecution>(|actor, envelope| {
        let request = envelope.message().request.clone();
        let correlation_id = request.correlation_id.clone();

        let rejection = match actor.model.host {
            Some(ref host) => host.spawn_tool_execution(request).err().map(|e| e.to_string()),
            None => Some("no tool host mounted".to_string()),
        };

        let Some(reason) = rejection else {
            return Reply::ready();
        };

        tracing::warn!(
            correlation_id = %correlation_id,
            reason = %reason,
            "Tool request rejected"
        );

        let broker = actor.broker().clone();
        Reply::pending(async move {
            broker
                .broadcast(ToolRequestRejected {
                    correlation_id,
                    reason,
                })
                .await;
        })
    });

    // The wait runs on its own task; pending handler futures are flushed
    // before the next message, so parking here would stall the mailbox.
    builder.act_on::<FetchToolResult>(|actor, envelope| {
        let correlation_id = envelope.message().correlation_id.clone();
        let broker = actor.broker().clone();

        let Some(host) = actor.model.host.clone() else {
            let result = ToolResult::not_found(correlation_id);
            return Reply::pending(async move {
                broker.broadcast(ToolResultReady { result }).await;
            });
        };

        tracing::trace!(correlation_id = %correlation_id, "Parking tool result fetch");
        tokio::spawn(async move {
            let result = host.fetch_tool_result(&correlation_id).await;
            broker.broadcast(ToolResultReady { result }).await;
        });
        Reply::ready()
    });

    builder.act_on::<FetchOutgoingMessages>(|actor, _envelope| {
        let (host, messages) = match actor.model.host {
            Some(ref host) => (host.name().to_string(), host.fetch_outgoing_messages()),
            None => (String::new(), Vec::new()),
        };
        let broker = actor.broker().clone();

        Reply::pending(async move {
            broker.broadcast(OutgoingMessages { host, messages }).await;
        })
    });

    builder.act_on::<ListCapabilities>(|actor, _envelope| {
        let list = match actor.model.host {
            Some(ref host) => CapabilityList {
                host: host.name().to_string(),
                capabilities: host.list_registered_capabilities(),
                intercepted: host.intercepted_capabilities(),
            },
            None => CapabilityList {
                host: String::new(),
                capabilities: Vec::new(),
                intercepted: Vec::new(),
            },
        };
        let broker = actor.broker().clone();

        Reply::pending(async move {
            broker.broadcast(list).await;
        })
    });
}
