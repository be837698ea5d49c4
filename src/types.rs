use std::sync::{Arc, RwLock};

use crossbeam_channel::{Receiver, Sender};

use crate::nes::Nes;

/// The console behind the lock shared by emulation and inspection threads
pub type SharedNesLock = Arc<RwLock<Nes>>;

/// Frontend side of a controller input channel, one button byte per message
pub type ButtonsSender = Sender<u8>;
pub type ButtonsReceiver = Receiver<u8>;
