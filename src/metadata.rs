use serde_json::Value;

/// Song fields extracted from a raw metadata record. Every field is
/// optional; placeholder values from the lookup tool count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongInfo {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
}

pub fn extract_song_info(record: &Value) -> SongInfo {
    SongInfo {
        artist: resolve_artist(record),
        title: resolve_title(record),
        genre: resolve_genre(record),
    }
}

/// The cover-art reference carried by the record, if any.
pub fn cover_reference(record: &Value) -> Option<String> {
    record
        .get("cover_url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}

fn resolve_artist(record: &Value) -> Option<String> {
    let from_list = record
        .get("artists")
        .and_then(Value::as_array)
        .and_then(|artists| artists.first())
        .and_then(|artist| artist.get("name"))
        .and_then(Value::as_str);

    from_list
        .or_else(|| record.get("artist").and_then(Value::as_str))
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "Unknown Artist")
        .map(str::to_owned)
}

fn resolve_title(record: &Value) -> Option<String> {
    record
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "Unknown Title")
        .map(str::to_owned)
}

fn resolve_genre(record: &Value) -> Option<String> {
    record
        .get("genres")
        .and_then(Value::as_array)
        .and_then(|genres| genres.first())
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn extracts_all_fields_from_full_record() {
        let record = json!({
            "name": "T",
            "artists": [{"name": "A"}, {"name": "B"}],
            "genres": ["pop", "rock"],
            "cover_url": "https://example.com/cover.jpg",
        });

        let info = extract_song_info(&record);

        assert_eq!(info.artist.as_deref(), Some("A"));
        assert_eq!(info.title.as_deref(), Some("T"));
        assert_eq!(info.genre.as_deref(), Some("pop"));
        assert_eq!(
            cover_reference(&record).as_deref(),
            Some("https://example.com/cover.jpg")
        );
    }

    #[test]
    fn falls_back_to_flat_artist_field() {
        let record = json!({"name": "T", "artist": " Solo Act "});
        assert_eq!(extract_song_info(&record).artist.as_deref(), Some("Solo Act"));
    }

    #[test]
    fn placeholder_values_count_as_absent() {
        let record = json!({
            "name": "Unknown Title",
            "artists": [{"name": "Unknown Artist"}],
        });

        let info = extract_song_info(&record);
        assert_eq!(info.artist, None);
        assert_eq!(info.title, None);
        assert_eq!(info.genre, None);
    }

    #[test]
    fn empty_and_missing_fields_yield_none() {
        let record = json!({"name": "   ", "artists": [], "genres": []});

        let info = extract_song_info(&record);
        assert_eq!(info, SongInfo::default());
        assert_eq!(cover_reference(&record), None);
    }

    #[test]
    fn blank_cover_url_is_ignored() {
        let record = json!({"cover_url": "  "});
        assert_eq!(cover_reference(&record), None);
    }
}
