use crate::config::Settings;
use tracing::info;

/// Audio capability port. Call sites always go through this trait; when
/// audio is disabled or unavailable the no-op implementation is selected
/// once at startup, never checked again at call sites.
pub(crate) trait AudioPort {
    fn play_click(&mut self);
    fn start_bgm(&mut self);
    fn stop_bgm(&mut self);
    fn set_sfx_volume(&mut self, volume: f32);
    fn set_bgm_volume(&mut self, volume: f32);
}

pub(crate) struct NullAudio;

impl AudioPort for NullAudio {
    fn play_click(&mut self) {}
    fn start_bgm(&mut self) {}
    fn stop_bgm(&mut self) {}
    fn set_sfx_volume(&mut self, _volume: f32) {}
    fn set_bgm_volume(&mut self, _volume: f32) {}
}

pub(crate) fn open_port(settings: &Settings) -> Box<dyn AudioPort> {
    if !settings.enable_audio {
        return Box::new(NullAudio);
    }

    #[cfg(feature = "audio")]
    {
        match rodio_port::RodioAudio::new(
            &settings.sounds_dir,
            settings.sfx_volume,
            settings.bgm_volume,
        ) {
            Ok(port) => {
                info!("audio system initialized");
                return Box::new(port);
            }
            Err(e) => tracing::warn!("audio init failed, running silent: {e:#}"),
        }
    }
    #[cfg(not(feature = "audio"))]
    info!("built without the audio feature, running silent");

    Box::new(NullAudio)
}

#[cfg(feature = "audio")]
mod rodio_port {
    use super::AudioPort;
    use anyhow::{Context, Result};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::{
        fs::File,
        io::BufReader,
        path::{Path, PathBuf},
    };
    use tracing::{debug, warn};

    pub(crate) struct RodioAudio {
        // Keeps the device alive; dropped with the port on shutdown.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        click_path: Option<PathBuf>,
        bgm_path: Option<PathBuf>,
        bgm_sink: Option<Sink>,
        sfx_volume: f32,
        bgm_volume: f32,
    }

    impl RodioAudio {
        pub(crate) fn new(sounds_dir: &Path, sfx_volume: f32, bgm_volume: f32) -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().context("opening audio output device")?;

            let click_path = existing(sounds_dir.join("click.wav"));
            let bgm_path = existing(sounds_dir.join("bgm.mp3"));
            if click_path.is_none() && bgm_path.is_none() {
                debug!("no sound files in {}", sounds_dir.display());
            }

            Ok(Self {
                _stream: stream,
                handle,
                click_path,
                bgm_path,
                bgm_sink: None,
                sfx_volume: sfx_volume.clamp(0.0, 1.0),
                bgm_volume: bgm_volume.clamp(0.0, 1.0),
            })
        }
    }

    fn existing(path: PathBuf) -> Option<PathBuf> {
        path.exists().then_some(path)
    }

    fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Decoder::new(BufReader::new(file)).context("decoding sound file")
    }

    impl AudioPort for RodioAudio {
        fn play_click(&mut self) {
            let Some(path) = &self.click_path else { return };
            match (open_source(path), Sink::try_new(&self.handle)) {
                (Ok(source), Ok(sink)) => {
                    sink.set_volume(self.sfx_volume);
                    sink.append(source);
                    sink.detach();
                }
                (Err(e), _) | (_, Err(e)) => warn!("click playback failed: {e:#}"),
            }
        }

        fn start_bgm(&mut self) {
            let Some(path) = &self.bgm_path else { return };
            match (open_source(path), Sink::try_new(&self.handle)) {
                (Ok(source), Ok(sink)) => {
                    sink.set_volume(self.bgm_volume);
                    sink.append(source.repeat_infinite());
                    self.bgm_sink = Some(sink);
                }
                (Err(e), _) | (_, Err(e)) => warn!("bgm playback failed: {e:#}"),
            }
        }

        fn stop_bgm(&mut self) {
            if let Some(sink) = self.bgm_sink.take() {
                sink.stop();
            }
        }

        fn set_sfx_volume(&mut self, volume: f32) {
            self.sfx_volume = volume.clamp(0.0, 1.0);
        }

        fn set_bgm_volume(&mut self, volume: f32) {
            self.bgm_volume = volume.clamp(0.0, 1.0);
            if let Some(sink) = &self.bgm_sink {
                sink.set_volume(self.bgm_volume);
            }
        }
    }
}
