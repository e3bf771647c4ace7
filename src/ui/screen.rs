use ratatui::Frame;

use crate::{App, ScreenModel};

/// A UI Screen boundary: responsible for rendering
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Capture screen - the three prompts
pub struct CaptureScreen;

impl Screen for CaptureScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Timer screen - hourglass, readout and the finish/extend footer
pub struct TimerScreen;

impl Screen for TimerScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if f.area().height < super::hourglass::HOURGLASS_HEIGHT {
            // too short for the glass; the readout alone still tells the time
            let label = match &app.screen {
                ScreenModel::Timer {
                    remaining_label, ..
                } => remaining_label.as_str(),
                ScreenModel::Capture { .. } => "",
            };
            f.render_widget(ratatui::widgets::Paragraph::new(label), f.area());
            return;
        }
        f.render_widget(app, f.area());
    }
}

/// Helper to construct the appropriate screen for the current model
pub fn current_screen(model: &ScreenModel) -> Box<dyn Screen> {
    match model {
        ScreenModel::Capture { .. } => Box::new(CaptureScreen),
        ScreenModel::Timer { .. } => Box::new(TimerScreen),
    }
}
