//! # cellview
//!
//! Slot-indexed state cells driving batched re-renders of declarative
//! terminal views.
//!
//! A view is a function from its state to a UI description. State is
//! declared through [`ViewContext::create_state`](view::ViewContext::create_state),
//! which binds each declaration to a slot by order. Event handlers call
//! `replace` on the captured [`StateCell`](state::StateCell); the replacement is
//! queued and the owning instance is re-rendered once per event turn by the
//! [`Host`](host::Host).
//!
//! ## Core Systems
//!
//! - **[`state`]**: State cells, queued updates, batching, slot faults
//! - **[`view`]**: The `View` trait, render context, UI description tree
//! - **[`host`]**: Mounting, flushing, dispatching events to handlers
//! - **[`event`]**: Terminal input, key bindings, UI events, event queue
//! - **[`focus`]**: Tab-order focus chain
//! - **[`render`]**: Plain-text layout and the crossterm driver
//! - **[`app`]**: Interactive terminal application
//! - **[`demos`]**: Counter and greeter views
//! - **[`testing`]**: Headless pilot and snapshot helpers

// Core
pub mod state;
pub mod view;
pub mod host;

// Events and focus
pub mod event;
pub mod focus;

// Rendering
pub mod render;

// Application
pub mod app;
pub mod demos;
pub mod logging;

// Test support
pub mod testing;
