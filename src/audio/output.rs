#[cfg(feature = "sound")]
pub(super) use device::Output;
#[cfg(not(feature = "sound"))]
pub(super) use silent::Output;

#[cfg(feature = "sound")]
mod device {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    pub struct Output {
        // Dropping the stream stops playback, so it lives as long as the handle
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl Output {
        pub fn open() -> Option<Self> {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Some(Self {
                    _stream: stream,
                    handle,
                }),
                Err(err) => {
                    warn!(%err, "no audio output device, sounds disabled");
                    None
                }
            }
        }

        pub fn play(&self, bytes: Arc<[u8]>) {
            let source = match Decoder::new(Cursor::new(bytes)) {
                Ok(source) => source,
                Err(err) => {
                    warn!(%err, "failed to decode sound");
                    return;
                }
            };

            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.append(source);
                    sink.detach();
                }
                Err(err) => warn!(%err, "failed to start playback"),
            }
        }
    }
}

#[cfg(not(feature = "sound"))]
mod silent {
    use std::sync::Arc;

    use tracing::debug;

    pub struct Output;

    impl Output {
        pub fn open() -> Option<Self> {
            debug!("built without the `sound` feature, sounds disabled");
            None
        }

        pub fn play(&self, _bytes: Arc<[u8]>) {}
    }
}
