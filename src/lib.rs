// Library root
// -----------
// This crate exposes the pieces of the GPR Reader CLI as a library. The
// binary (`main.rs`) wires them to the real terminal and network; tests
// wire them to scripted input and a fake transport.
//
// Module responsibilities:
// - `config`: environment-driven settings and in-memory credentials.
// - `api`: blocking HTTP transport (one JSON POST, raw status and body).
// - `provider`: per-provider request shapes and reply/error extraction.
// - `chat`: the turn-by-turn chat session shared by both providers.
// - `intensity`: image decoding and grayscale conversion.
// - `render`: terminal heat map for intensity grids.
// - `reader`: the `upload <path>` sub-loop behind `read_gpr`.
// - `menu`: the top-level command loop.
// - `ui`: input sources, spinner and text wrapping.
pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod intensity;
pub mod menu;
pub mod provider;
pub mod reader;
pub mod render;
pub mod ui;
