use crate::store::Store;
use crate::updates::{UpdateChecker, Version};
use crate::AppResult;
use console::{Style, Term};
use rvstruct::ValueStruct;

pub async fn command_updates(term: &Term, store: &Store, dismiss: bool) -> AppResult<()> {
    if dismiss {
        store.dismiss_update()?;
        term.write_line("Update banner dismissed.")?;
        return Ok(());
    }

    let current = Version::current()?;
    let checker = UpdateChecker::new(store, current);
    match checker.check(true).await? {
        Some(update) => {
            term.write_line(
                format!(
                    "{} v{} ({})",
                    Style::new().bold().green().apply_to("Update available:"),
                    update.latest_version,
                    update.download_url.value()
                )
                .as_str(),
            )?;
        }
        None => {
            term.write_line(
                format!("You are on the latest version (v{}).", current).as_str(),
            )?;
        }
    }
    Ok(())
}
