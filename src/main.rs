#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use std::path::Path;
#[cfg(feature = "gui")]
use std::sync::{Arc, Mutex};

#[cfg(feature = "gui")]
use gridseq::sequencer::layout::Control;
#[cfg(feature = "gui")]
use gridseq::sequencer::lock_session;
#[cfg(feature = "gui")]
use gridseq::{
    midi_note_name, Config, GridApp, GridDevice, GridEvent, MidiOutputDevice, VirtualGrid,
};

#[cfg(feature = "gui")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

#[cfg(feature = "gui")]
fn run() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(Path::new(&path))?,
        None => Config::default(),
    };

    let ports = MidiOutputDevice::available_ports();
    println!("Output Ports:");
    for name in &ports {
        println!("    '{}'", name);
    }
    println!();

    let mut midi = MidiOutputDevice::new(config.velocity);
    match &config.midi_port {
        Some(name) => midi.connect_matching(name)?,
        None if !ports.is_empty() => midi.connect(0)?,
        None => log::warn!("no MIDI output ports; triggers are dropped"),
    }
    let midi = Arc::new(Mutex::new(midi));

    let grid = VirtualGrid::new(config.grid_width, config.grid_height);
    let mut app = GridApp::new(config, midi.clone());
    app.on_ready(Arc::new(grid.clone()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 640.0])
            .with_title("GRIDSEQ - Grid Step Sequencer"),
        ..Default::default()
    };

    eframe::run_native(
        "GRIDSEQ",
        options,
        Box::new(move |_cc| Ok(Box::new(GridWindow::new(app, grid, midi)))),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}

#[cfg(feature = "gui")]
struct GridWindow {
    app: GridApp,
    grid: VirtualGrid,
    midi: Arc<Mutex<MidiOutputDevice>>,

    // UI state
    held: Option<(usize, usize)>,
}

#[cfg(feature = "gui")]
impl GridWindow {
    fn new(app: GridApp, grid: VirtualGrid, midi: Arc<Mutex<MidiOutputDevice>>) -> Self {
        Self {
            app,
            grid,
            midi,
            held: None,
        }
    }

    fn label(&self, x: usize, y: usize, control: Option<Control>) -> String {
        if y > 0 {
            return match self.app.config().note_for(y - 1) {
                Some(note) if x == 0 => midi_note_name(note),
                _ => String::new(),
            };
        }
        match control {
            Some(Control::Run) => "▶".to_string(),
            Some(Control::Faster) => "+".to_string(),
            Some(Control::Slower) => "-".to_string(),
            Some(Control::Clear) => "CLR".to_string(),
            Some(Control::Page(page)) => format!("P{}", page + 1),
            None => String::new(),
        }
    }

    fn press(&mut self, x: usize, y: usize) {
        self.held = Some((x, y));
        self.app.on_key(GridEvent::press(x, y));
    }

    fn release(&mut self) {
        if let Some((x, y)) = self.held.take() {
            self.app.on_key(GridEvent::release(x, y));
        }
    }
}

#[cfg(feature = "gui")]
impl eframe::App for GridWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        let (controls, status) = match self.app.session() {
            Some(session) => {
                let s = lock_session(session);
                let controls: Vec<Option<Control>> = (0..s.store.width())
                    .map(|x| s.store.layout().control_at(x))
                    .collect();
                let status = format!(
                    "{}  |  step {} ms  |  page {}",
                    if s.transport.is_running() { "Playing" } else { "Stopped" },
                    s.transport.step_period().as_millis(),
                    s.transport.current_page() + 1
                );
                (controls, status)
            }
            None => (Vec::new(), "No grid".to_string()),
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("GRIDSEQ - Grid Step Sequencer");
            ui.add_space(10.0);
            ui.label(status);
            ui.add_space(10.0);

            for y in 0..self.grid.height() {
                ui.horizontal(|ui| {
                    for x in 0..self.grid.width() {
                        let level = self.grid.level(x, y);
                        let control = controls.get(x).copied().flatten();
                        let fill = if level > 0 {
                            egui::Color32::from_rgb(220, 170, 60)
                        } else if y == 0 {
                            egui::Color32::from_rgb(50, 50, 70)
                        } else {
                            egui::Color32::from_rgb(40, 40, 40)
                        };
                        let button = egui::Button::new(self.label(x, y, control))
                            .min_size(egui::vec2(60.0, 60.0))
                            .fill(fill);

                        let response = ui.add(button);
                        if response.is_pointer_button_down_on() && self.held.is_none() {
                            self.press(x, y);
                        }
                    }
                });
            }

            ui.separator();
            ui.label("Top row: pages, clear, slower, faster, run/stop. Other rows toggle steps.");
            let connected = self.midi.lock().map(|m| m.is_connected()).unwrap_or(false);
            if !connected {
                ui.colored_label(egui::Color32::YELLOW, "⚠ No MIDI output connected");
            }
        });

        if self.held.is_some() && !ctx.input(|i| i.pointer.any_down()) {
            self.release();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.app.quit();
        if let Ok(mut midi) = self.midi.lock() {
            midi.disconnect();
        }
    }
}
