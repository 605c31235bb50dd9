//! Downloads: standings as CSV and file names for state exports.

use crate::models::StandingsPlayer;
use chrono::{DateTime, Utc};

/// File name for a state export taken at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("tournament-{}.json", at.format("%Y%m%d-%H%M%S"))
}

/// Standings table as CSV: rank, name, points, record, then the three tiebreakers in percent.
pub fn standings_to_csv(standings: &[StandingsPlayer]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["rank", "name", "points", "record", "omw_pct", "gw_pct", "ogw_pct"])?;
    for (idx, s) in standings.iter().enumerate() {
        let (wins, losses, draws) = s.record();
        writer.write_record([
            (idx + 1).to_string(),
            s.name.clone(),
            s.points.to_string(),
            format!("{}-{}-{}", wins, losses, draws),
            percent(s.omw_percentage),
            percent(s.gw_percentage),
            percent(s.ogw_percentage),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn percent(value: f64) -> String {
    format!("{:.2}", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn export_file_name_uses_utc_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 0).unwrap();
        assert_eq!(export_file_name(at), "tournament-20240309-170500.json");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(percent(1.0 / 3.0), "33.33");
        assert_eq!(percent(0.0), "0.00");
    }
}
