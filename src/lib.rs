//! canmux: a CAN responder that fans bus frames and named-pipe commands
//! into one ordered command queue over a shared bus handle.
#![deny(
    // missing_docs,
    clippy::all,
    clippy::correctness,
    clippy::perf,
    clippy::complexity,
    clippy::style,
    absolute_paths_not_starting_with_crate,
    rust_2021_incompatible_closure_captures,
    rust_2021_incompatible_or_patterns,
    rust_2021_prefixes_incompatible_syntax,
    rust_2021_prelude_collisions,
    variant_size_differences,
    clippy::clone_on_ref_ptr,
    clippy::else_if_without_else,
    clippy::exit,
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::if_then_some_else_none,
    clippy::shadow_unrelated,
    clippy::unwrap_used,
)]
#![cfg_attr(
    test,
    allow(
        clippy::indexing_slicing,
        unused_results,
        clippy::unwrap_used,
        clippy::unwrap_in_result,
        clippy::expect_used,
        clippy::as_conversions,
        clippy::shadow_unrelated,
        clippy::arithmetic_side_effects,
        clippy::let_underscore_untyped,
        clippy::pedantic,
        clippy::default_numeric_fallback,
        clippy::print_stderr,
    )
)]

pub mod bus;
pub mod command;
pub mod coordinator;
pub mod notify;
pub mod pipe;
pub mod router;
#[cfg(test)]
mod tests;

pub use bus::{Bus, BusError, CanBus, ChannelBus, Frame};
pub use command::{Command, CommandConsumer, CommandError, CommandProcessor, CommandQueue};
pub use coordinator::{Responder, ResponderBuilder};
pub use notify::{BufferedReader, Listener, Notifier, TraceLog};
pub use pipe::CommandPipe;
pub use router::FrameRouter;
