use crate::audio::{self, AudioPort};
use crate::config::{self, Paths, Settings};
use crate::input::{map_key, PetCommand, Scene};
use crate::model::{PetState, Tunables};
use crate::render::{self, View};
use crate::scheduler::Scheduler;
use crate::storage;
use crate::weather::{self, CurrentConditions, DailyForecast, WeatherCache};
use crate::Cli;
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

const PAT_REACTIONS: [&str; 4] = ["Hehe!", "Tickles!", "More!", "Hahaha!"];

/// Results delivered back into the event loop from background tasks.
/// Anything arriving after shutdown dies with the channel.
enum AppEvent {
    WeatherFetched(Result<(CurrentConditions, Vec<DailyForecast>)>),
}

struct Speech {
    text: String,
    remaining: u32,
}

struct App {
    settings: Settings,
    tunables: Tunables,
    pet: PetState,
    weather: WeatherCache,
    scheduler: Scheduler,
    audio: Box<dyn AudioPort>,
    paths: Paths,
    scene: Scene,
    speech: Option<Speech>,
    fetch_in_flight: bool,
    should_quit: bool,
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
}

pub(crate) async fn run(cli: Cli) -> Result<()> {
    let paths = config::project_paths(cli.data_dir.as_deref())?;
    let settings_path = cli.config.clone().unwrap_or_else(|| paths.settings_path.clone());
    let mut settings = config::load_settings(&settings_path);

    // CLI flags override the config file for this session only.
    if let Some(lat) = cli.lat {
        settings.latitude = lat;
    }
    if let Some(lon) = cli.lon {
        settings.longitude = lon;
    }
    if cli.no_weather {
        settings.enable_weather = false;
    }
    if cli.mute {
        settings.enable_audio = false;
        settings.enable_bgm = false;
    }

    let tunables = Tunables::default();
    let pet = storage::load_or_default(&paths.save_path);
    let weather = WeatherCache::new(Duration::from_secs(tunables.weather_refresh_secs));
    let scheduler = Scheduler::new(&tunables);

    let mut audio = audio::open_port(&settings);
    audio.set_sfx_volume(settings.sfx_volume);
    audio.set_bgm_volume(settings.bgm_volume);
    if settings.enable_bgm {
        audio.start_bgm();
    }

    let (tx, rx) = mpsc::channel(8);
    let mut app = App {
        settings,
        tunables,
        pet,
        weather,
        scheduler,
        audio,
        paths,
        scene: Scene::Main,
        speech: None,
        fetch_in_flight: false,
        should_quit: false,
        tx,
        rx,
    };

    let mut term = setup_terminal()?;
    let result = app.run_loop(&mut term).await;
    let restore = restore_terminal(&mut term);
    app.shutdown(&settings_path);
    result.and(restore)
}

impl App {
    async fn run_loop(&mut self, term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let tick_period = Duration::from_millis(self.tunables.tick_ms);

        while !self.should_quit {
            // Fetch completions first so a fresh snapshot is visible to
            // this tick's staleness check.
            while let Ok(ev) = self.rx.try_recv() {
                self.handle_event(ev);
            }

            let outcome = self.scheduler.tick(
                &mut self.pet,
                &self.weather,
                &self.tunables,
                Instant::now(),
                self.settings.enable_weather,
            );

            if outcome.save_due {
                self.save_pet();
            }
            if outcome.weather_due && !self.fetch_in_flight {
                self.dispatch_weather_fetch();
            }

            if let Some(s) = &mut self.speech {
                if s.remaining > 0 {
                    s.remaining -= 1;
                }
            }
            if self.speech.as_ref().map_or(false, |s| s.remaining == 0) {
                self.speech = None;
            }

            let view = View {
                scene: self.scene,
                pet: &self.pet,
                settings: &self.settings,
                weather: &self.weather,
                speech: self.speech.as_ref().map(|s| s.text.as_str()),
                frame_index: self.scheduler.frame_index(2),
                bgm_volume: self.settings.bgm_volume,
            };
            term.draw(|f| render::draw(f, &view))?;

            // Fixed-delay re-arm: the next tick starts one period after
            // this one finished, so the loop drifts under load rather
            // than bunching up.
            let deadline = Instant::now() + tick_period;
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                if event::poll(deadline - now)? {
                    if let Event::Key(k) = event::read()? {
                        if k.kind == KeyEventKind::Press {
                            if let Some(cmd) = map_key(self.scene, k.code) {
                                self.handle_command(cmd);
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::WeatherFetched(Ok((current, forecast))) => {
                info!("weather updated: {:.1}°C", current.temperature);
                self.weather.set(current, forecast, Instant::now());
                self.fetch_in_flight = false;
            }
            AppEvent::WeatherFetched(Err(e)) => {
                // Cache stays stale; the next due tick retries.
                warn!("weather refresh failed: {e:#}");
                self.fetch_in_flight = false;
            }
        }
    }

    fn dispatch_weather_fetch(&mut self) {
        self.fetch_in_flight = true;
        let tx = self.tx.clone();
        let (lat, lon) = (self.settings.latitude, self.settings.longitude);
        tokio::spawn(async move {
            let res = weather::fetch_current_and_daily(lat, lon).await;
            let _ = tx.send(AppEvent::WeatherFetched(res)).await;
        });
    }

    fn handle_command(&mut self, cmd: PetCommand) {
        match cmd {
            PetCommand::Quit => self.should_quit = true,
            PetCommand::Back => self.scene = Scene::Main,
            PetCommand::OpenFeedMenu => {
                self.audio.play_click();
                self.scene = Scene::FeedMenu;
            }
            PetCommand::OpenPlayMenu => {
                self.audio.play_click();
                self.scene = Scene::PlayMenu;
            }
            PetCommand::OpenWeather => self.scene = Scene::Weather,
            PetCommand::OpenHelp => self.scene = Scene::Help,
            PetCommand::Sleep => {
                self.audio.play_click();
                let text = self.pet.sleep(&self.tunables);
                self.say(text, 60);
            }
            PetCommand::Pat => {
                self.audio.play_click();
                self.pet.pat(&self.tunables);
                let pick = self.scheduler.tick_count() as usize % PAT_REACTIONS.len();
                self.say(PAT_REACTIONS[pick].to_string(), 40);
            }
            PetCommand::Choose(index) => {
                match self.scene {
                    Scene::FeedMenu => {
                        if let Some((food, gain)) = nth_entry(&self.settings.foods, index) {
                            self.audio.play_click();
                            let text = self.pet.feed(&food, gain, &self.tunables);
                            self.say(text, 50);
                        }
                    }
                    Scene::PlayMenu => {
                        if let Some((activity, gain)) = nth_entry(&self.settings.plays, index) {
                            self.audio.play_click();
                            let text = self.pet.play(&activity, gain, &self.tunables);
                            self.say(text, 50);
                        }
                    }
                    _ => {}
                }
                self.scene = Scene::Main;
            }
            PetCommand::VolumeUp => self.adjust_volume(0.1),
            PetCommand::VolumeDown => self.adjust_volume(-0.1),
        }
    }

    fn adjust_volume(&mut self, delta: f32) {
        let v = (self.settings.bgm_volume + delta).clamp(0.0, 1.0);
        self.settings.bgm_volume = v;
        self.settings.sfx_volume = v;
        self.audio.set_bgm_volume(v);
        self.audio.set_sfx_volume(v);
        self.say(format!("Volume: {}%", (v * 100.0).round() as i32), 30);
    }

    fn say(&mut self, text: String, frames: u32) {
        self.speech = Some(Speech {
            text,
            remaining: frames,
        });
    }

    fn save_pet(&self) {
        let snap = self.pet.snapshot(chrono::Utc::now());
        if let Err(e) = storage::save_atomic(&self.paths.save_path, &snap) {
            // In-memory state is untouched; the next interval retries.
            warn!("pet save failed: {e:#}");
        }
    }

    /// Final synchronous flush; failures are logged, never surfaced.
    fn shutdown(&mut self, settings_path: &std::path::Path) {
        self.audio.stop_bgm();
        self.save_pet();
        if let Err(e) = config::save_settings_atomic(settings_path, &self.settings) {
            warn!("config save failed: {e:#}");
        }
    }
}

fn nth_entry(map: &BTreeMap<String, f32>, index: usize) -> Option<(String, f32)> {
    map.iter().nth(index).map(|(k, v)| (k.clone(), *v))
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, cursor::Hide)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, cursor::Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    term.show_cursor()?;
    Ok(())
}
