use crate::error::CevError;
use crate::extraction::{BBox, Document, Word};
use crate::schema::Region;

/// Text inside `region` on `page` (1-based), all lines joined with single
/// spaces. A region that falls off the page reads as empty.
///
/// Words are taken or dropped whole, never clipped: a word counts when at
/// least half of its box lies inside the region, so a word that only grazes
/// the edge belongs to the neighbouring field.
pub fn read(document: &Document, page: usize, region: &Region) -> Result<String, CevError> {
    Ok(read_lines(document, page, region)?.join(" "))
}

/// Lines inside `region`, top to bottom, then left to right.
///
/// A word belongs to the region when at least half of its box lies inside
/// the region once the region is scaled to the page and clipped to it.
pub fn read_lines(
    document: &Document,
    page: usize,
    region: &Region,
) -> Result<Vec<String>, CevError> {
    let layout = document.page(page).ok_or(CevError::PageCount {
        found: document.page_count(),
        required: page,
    })?;

    let Some(clip) = region.to_page_bbox(layout.width, layout.height) else {
        return Ok(Vec::new());
    };

    let mut hits: Vec<(f32, f32, String)> = Vec::new();
    for line in &layout.lines {
        let mut words: Vec<&Word> = line
            .words
            .iter()
            .filter(|w| covers(&clip, &w.bbox))
            .collect();
        if words.is_empty() {
            continue;
        }
        words.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));

        let top = words.iter().map(|w| w.bbox.y_min).fold(f32::INFINITY, f32::min);
        let left = words[0].bbox.x_min;
        let text = normalize_ws(
            &words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        if !text.is_empty() {
            hits.push((top, left, text));
        }
    }

    hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    Ok(hits.into_iter().map(|(_, _, text)| text).collect())
}

fn covers(clip: &BBox, word: &BBox) -> bool {
    let area = word.area();
    if area <= 0.0 {
        let cx = (word.x_min + word.x_max) / 2.0;
        let cy = (word.y_min + word.y_max) / 2.0;
        return clip.contains_point(cx, cy);
    }
    clip.intersection_area(word) * 2.0 >= area
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{PageLayout, TextLine};
    use crate::schema::{REPORT_HEIGHT_MM, REPORT_WIDTH_MM};

    // Page in millimetres so regions and word boxes share units.
    fn word(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Word {
        Word {
            text: text.to_string(),
            bbox: BBox {
                x_min: x0,
                y_min: y0,
                x_max: x1,
                y_max: y1,
            },
        }
    }

    fn doc(lines: Vec<Vec<Word>>) -> Document {
        Document::new(vec![PageLayout {
            page_number: 1,
            width: REPORT_WIDTH_MM,
            height: REPORT_HEIGHT_MM,
            lines: lines.into_iter().map(|words| TextLine { words }).collect(),
        }])
    }

    #[test]
    fn test_reads_words_inside_region() {
        let d = doc(vec![vec![
            word("Comuna:", 5.0, 33.0, 25.0, 37.0),
            word("Puerto", 30.0, 33.0, 45.0, 37.0),
            word("Montt", 46.0, 33.0, 60.0, 37.0),
        ]]);
        let text = read(&d, 1, &Region::new(29.2, 33.0, 80.0, 38.2)).unwrap();
        assert_eq!(text, "Puerto Montt");
    }

    #[test]
    fn test_half_covered_word_included() {
        let d = doc(vec![vec![
            word("in", 10.0, 10.0, 20.0, 14.0),
            word("out", 18.0, 20.0, 28.0, 24.0),
        ]]);
        // "in" is exactly half inside, "out" is below the region.
        let text = read(&d, 1, &Region::new(15.0, 9.0, 40.0, 15.0)).unwrap();
        assert_eq!(text, "in");
    }

    #[test]
    fn test_mostly_outside_word_dropped_whole() {
        // 4 of 10 mm inside the region.
        let d = doc(vec![vec![word("borde", 10.0, 10.0, 20.0, 14.0)]]);
        assert_eq!(read(&d, 1, &Region::new(16.0, 9.0, 40.0, 15.0)).unwrap(), "");
        assert_eq!(read(&d, 1, &Region::new(0.0, 9.0, 16.0, 15.0)).unwrap(), "borde");
    }

    #[test]
    fn test_lines_sorted_top_to_bottom() {
        let d = doc(vec![
            vec![word("abajo", 10.0, 30.0, 20.0, 34.0)],
            vec![word("arriba", 10.0, 20.0, 20.0, 24.0)],
        ]);
        let lines = read_lines(&d, 1, &Region::new(5.0, 15.0, 30.0, 40.0)).unwrap();
        assert_eq!(lines, vec!["arriba", "abajo"]);
    }

    #[test]
    fn test_region_outside_page_is_empty() {
        let d = doc(vec![vec![word("x", 10.0, 10.0, 20.0, 14.0)]]);
        assert_eq!(read(&d, 1, &Region::new(220.0, 10.0, 240.0, 20.0)).unwrap(), "");
    }

    #[test]
    fn test_missing_page_is_page_count_error() {
        let d = doc(vec![]);
        assert!(matches!(
            read(&d, 2, &Region::new(0.0, 0.0, 10.0, 10.0)),
            Err(CevError::PageCount { found: 1, required: 2 })
        ));
    }
}
