use crate::areas::repository::Repository;
use colored::Colorize;

impl Repository {
    pub async fn log_in(&self) -> anyhow::Result<()> {
        let user = self.login().await?;

        writeln!(
            self.writer(),
            "{} as {}",
            "Logged in".green(),
            user.name.as_deref().unwrap_or(&user.login)
        )?;

        Ok(())
    }

    pub fn log_out(&self) -> anyhow::Result<()> {
        if self.logout()? {
            writeln!(self.writer(), "Logged out")?;
        } else {
            writeln!(self.writer(), "No stored credential for this repository")?;
        }

        Ok(())
    }
}
