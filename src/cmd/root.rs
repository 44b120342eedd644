use crate::data::{AppSettings, Persistable, WorkRecordData};
use crate::ui::month_view::{run_app, App};
use crate::ui::{restore_terminal, setup_terminal};
use anyhow::Result;
use chrono::Local;
use tracing::info;

pub fn run(employee: &str, settings: AppSettings) -> Result<()> {
    let mut records = WorkRecordData::load()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen
        );
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;

    let today = Local::now().date_naive();
    let mut app = App::new(&mut records, settings, employee, today);
    let result = run_app(&mut terminal, &mut app);

    restore_terminal(&mut terminal)?;

    let dirty = app.dirty;
    drop(app);

    if dirty {
        records.save()?;
        info!(employee, "records saved from month view");
    }

    result
}
