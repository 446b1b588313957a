//! Dispatch engine: resolve inbound call frames against the provider.
//!
//! Dispatch never fails from the transport's point of view. Every fault -
//! missing provider, access violation, unknown member, or an error inside
//! the provider function - becomes a negative return frame for the caller.
//!
//! # Access Rules
//!
//! A path segment is rejected before touching the provider when it
//!
//! - starts with `_` (underscore-prefixed members are private),
//! - ends with `_` (underscore-suffixed members are private),
//! - equals `constructor` or `prototype`.
//!
//! The underscore rules also cover dunder names such as `__proto__`. These
//! rules exist so a remote peer cannot traverse into internal slots; they
//! are intentionally not configurable.

use std::rc::Rc;

use farcall_core::{InvokeFunction, InvokeReturn};

use super::provider::{CallFault, ProviderFn, ProviderNode, ProviderObject};

/// Snapshot of the provider slot, taken once when a dispatch begins.
#[derive(Clone, Debug, Default)]
pub(crate) enum ProviderSlot {
    /// `set_provider` has never been called.
    #[default]
    Unset,
    /// The peer explicitly offers nothing.
    Null,
    /// An installed provider object.
    Object(Rc<ProviderObject>),
}

/// Resolve and invoke `function`, producing its return frame.
pub(crate) async fn dispatch(provider: ProviderSlot, function: InvokeFunction) -> InvokeReturn {
    let uid = function.uid;
    match resolve(&provider, &function.listener) {
        Ok(target) => {
            let arguments = function
                .parameters
                .into_iter()
                .map(|parameter| parameter.value)
                .collect();
            match target(arguments).await {
                Ok(value) => InvokeReturn {
                    uid,
                    success: true,
                    value,
                },
                Err(fault) => InvokeReturn {
                    uid,
                    success: false,
                    value: fault.into_value(),
                },
            }
        }
        Err(fault) => InvokeReturn {
            uid,
            success: false,
            value: fault.into_value(),
        },
    }
}

/// Walk `listener` over the provider tree to the function it names.
fn resolve(provider: &ProviderSlot, listener: &str) -> Result<ProviderFn, CallFault> {
    let root = match provider {
        ProviderSlot::Unset => {
            return Err(CallFault::error("the provider is not specified yet."));
        }
        ProviderSlot::Null => {
            return Err(CallFault::error("the provider would not be provided."));
        }
        ProviderSlot::Object(object) => object,
    };

    let count = listener.split('.').count();
    let mut object: &ProviderObject = root;
    let mut function: Option<&ProviderFn> = None;

    for (index, segment) in listener.split('.').enumerate() {
        if let Some(reason) = forbidden_segment(segment) {
            return Err(CallFault::error(format!(
                "access to member \"{segment}\" is forbidden: {reason}."
            )));
        }
        let member = object.get(segment).ok_or_else(|| {
            CallFault::error(format!(
                "unable to find function \"{listener}\": no member \"{segment}\"."
            ))
        })?;
        let last = index + 1 == count;
        match member {
            ProviderNode::Object(next) if !last => object = next,
            ProviderNode::Function(f) if last => function = Some(f),
            ProviderNode::Object(_) => {
                return Err(CallFault::error(format!(
                    "\"{listener}\" is not a function."
                )));
            }
            ProviderNode::Function(_) => {
                return Err(CallFault::error(format!(
                    "unable to find function \"{listener}\": \"{segment}\" is not an object."
                )));
            }
        }
    }

    function
        .cloned()
        .ok_or_else(|| CallFault::error(format!("\"{listener}\" is not a function.")))
}

/// Why a path segment is rejected, if it is.
fn forbidden_segment(segment: &str) -> Option<&'static str> {
    if segment.starts_with('_') {
        Some("underscore-prefixed members are private")
    } else if segment.ends_with('_') {
        Some("underscore-suffixed members are private")
    } else if segment == "constructor" || segment == "prototype" {
        Some("reflective members can not be called remotely")
    } else {
        None
    }
}
