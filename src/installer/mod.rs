//! Installation steps and the pipeline that runs them.
//!
//! - [`reconcile`]: clear an existing installation, keeping its config
//! - [`patch`]: merge `package.json` and extend `renderer.js`
//! - [`disable`]: rename the installer directory once done
//! - [`state`]: the [`PipelineState`] machine
//! - [`pipeline`]: [`UpdatePipeline`], which sequences everything above and
//!   the [`release`](crate::release) steps

pub mod disable;
pub mod patch;
pub mod pipeline;
pub mod reconcile;
pub mod state;

pub use disable::SelfDisabler;
pub use patch::{ConfigDocument, Patcher, append_script};
pub use pipeline::{InstallOutcome, UpdatePipeline};
pub use reconcile::DirectoryReconciler;
pub use state::{InvalidTransition, PipelineState};
