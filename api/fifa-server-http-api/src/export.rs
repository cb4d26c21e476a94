use fifa_server_app::domain::player::Player;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const CSV_DISPOSITION: &str = "attachment; filename=\"players.csv\"";

const HEADER: &str = "id,name,club,position,rating,nationality";

fn quoted(value: Option<&str>) -> String {
    format!("\"{}\"", value.unwrap_or("").replace('"', "\"\""))
}

/// Text columns are always quoted, numbers never. Rows are CRLF separated
/// with no trailing newline.
pub fn render_players_csv(players: &[Player]) -> String {
    let mut lines = Vec::with_capacity(players.len() + 1);
    lines.push(HEADER.to_string());
    for player in players {
        lines.push(
            [
                player.id.to_string(),
                quoted(Some(&player.name)),
                quoted(player.club.as_deref()),
                quoted(player.position.as_deref()),
                player.rating.to_string(),
                quoted(player.nationality.as_deref()),
            ]
            .join(","),
        );
    }
    lines.join("\r\n")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fifa_server_app::domain::PlayerId;

    use super::*;

    fn player(id: i64, name: &str, club: Option<&str>) -> Player {
        Player {
            id: PlayerId(id),
            name: name.to_string(),
            club: club.map(str::to_string),
            position: Some("CF".to_string()),
            rating: 84,
            nationality: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_escapes_quotes_and_blanks() {
        let csv = render_players_csv(&[
            player(1, "Joao \"Jota\" Felix", Some("Chelsea")),
            player(2, "Darwin Nunez", None),
        ]);
        assert_eq!(
            csv,
            "id,name,club,position,rating,nationality\r\n\
             1,\"Joao \"\"Jota\"\" Felix\",\"Chelsea\",\"CF\",84,\"\"\r\n\
             2,\"Darwin Nunez\",\"\",\"CF\",84,\"\""
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_players_csv(&[]), HEADER);
    }
}
