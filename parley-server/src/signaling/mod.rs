mod ws_handler;

pub use ws_handler::router;
