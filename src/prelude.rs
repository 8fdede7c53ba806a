pub use anyhow::{anyhow, bail, Context, Result};
pub use bytes::{Bytes, BytesMut};
pub use log::{debug, error, info, trace, warn};

pub use crate::error::Error;
pub use crate::utils::Utils;
