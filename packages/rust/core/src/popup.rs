//! Marker popup content.

use serde::Serialize;

use waymark_shared::ItineraryStep;

/// What a marker popup shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub badge: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub photo_count: usize,
}

/// Build the popup for a step. `fallback_region` is usually the trip's country.
pub fn popup_for(step: &ItineraryStep, fallback_region: Option<&str>, excerpt_chars: usize) -> Popup {
    Popup {
        title: step.name.clone(),
        region: step
            .region
            .clone()
            .or_else(|| fallback_region.map(str::to_owned)),
        excerpt: step
            .description
            .as_deref()
            .map(|d| truncate_excerpt(d, excerpt_chars)),
        badge: step.badge(),
        duration: step.duration().map(str::to_owned),
        photo_count: step.gallery.len(),
    }
}

/// Collapse whitespace and cut to at most `max_chars` characters, ending
/// in `…` when anything was cut.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let kept: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::test_support::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_excerpt("Yurt camp", 20), "Yurt camp");
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        let text = "Ысык-Көл — жемчужина Тянь-Шаня";
        let cut = truncate_excerpt(text, 8);
        assert_eq!(cut.chars().count(), 8);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(truncate_excerpt("  a \n\n b  ", 10), "a b");
    }

    #[test]
    fn region_falls_back_to_trip_country() {
        let mut step = full_day("Bishkek", Some((42.87, 74.57)));
        step.description = Some("Arrival in the capital.".into());
        let popup = popup_for(&step, Some("Kyrgyzstan"), 120);
        assert_eq!(popup.region.as_deref(), Some("Kyrgyzstan"));
        assert_eq!(popup.badge, "Full day");
        assert_eq!(popup.excerpt.as_deref(), Some("Arrival in the capital."));

        step.region = Some("Chuy".into());
        let popup = popup_for(&step, Some("Kyrgyzstan"), 120);
        assert_eq!(popup.region.as_deref(), Some("Chuy"));
    }

    #[test]
    fn side_trip_badge() {
        let popup = popup_for(&side_trip("Burana", None), None, 120);
        assert_eq!(popup.badge, "Side trip");
        assert!(popup.excerpt.is_none());
        assert_eq!(popup.photo_count, 0);
    }
}
