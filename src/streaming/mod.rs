//! In-memory object streams for storage plugins.
//!
//! Reproduces the observable behavior of the plugin RPC transport for the two
//! streaming calls, so hosts and plugins can be exercised without a wire.
//!
//! # Architecture
//!
//! ```text
//! GetObject (1 request, N responses):
//! +------------------+   GetObjectResponse*   +------------------+
//! | GetObjectServer  | ---------------------> | GetObjectClient  |
//! |  send/send_error |    one HandoffChannel  |  recv/close_send |
//! +------------------+                        +------------------+
//!
//! PutObject (N requests, 1 response):
//! +------------------+   PutObjectRequest*    +------------------+
//! | PutObjectClient  | ---------------------> | PutObjectServer  |
//! |                  | <--------------------- |                  |
//! +------------------+   PutObjectResponse    +------------------+
//! ```
//!
//! Every channel is unbuffered: a send returns only after the peer took the
//! item. Each channel owns a [`StreamGuard`] so it closes exactly once, no
//! matter which endpoint (or both at once) asks.

pub mod channel;
pub mod get_object;
pub mod guard;
pub mod protocol;
pub mod put_object;

pub use channel::HandoffChannel;
pub use get_object::{GetObjectClient, GetObjectServer, GetObjectStream};
pub use guard::StreamGuard;
pub use protocol::{
    Frame, GetObjectRequest, GetObjectResponse, ObjectKey, PutObjectRequest, PutObjectResponse,
    StreamMessage,
};
pub use put_object::{PutObjectClient, PutObjectServer, PutObjectStream};
