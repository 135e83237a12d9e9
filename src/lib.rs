// Library root
// -----------
// Interactive CLI for bulk-generating per-page preview images from a
// CHILI-style publishing server. The binary (`main.rs`) wires these modules
// into the bootstrap-then-navigate loop.
//
// Module responsibilities:
// - `api`: the remote RPC client (session verify, key issuance, tree
//   listing, copy, definition, streamed page downloads) behind the
//   `RemoteApi` trait.
// - `config`: optional local defaults for URL and credentials.
// - `session`: URL and credential bootstrap loops producing an immutable
//   `Session`.
// - `nav`: path stack and folder-menu construction.
// - `pipeline`: the per-folder preview fetch run.
// - `staging`: clean-slate per-document output directories.
// - `ui`: dialoguer prompts behind the `Prompt` trait, banners, progress.
pub mod api;
pub mod config;
pub mod nav;
pub mod pipeline;
pub mod session;
pub mod staging;
pub mod ui;
