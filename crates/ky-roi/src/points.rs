use ky_core::{Error, Point2f, Result};

/// Parses a polyline points string into an ordered point list.
///
/// Accepted form: `points[x,y, x,y, ...]`, optionally followed by further
/// bracketed lists (`points1[...] points2[...]`) which are ignored. Only the
/// first list is used.
pub fn parse_points(raw: &str) -> Result<Vec<Point2f>> {
    let trimmed = raw.trim();
    let Some(pos) = trimmed.find("points") else {
        return Err(Error::shape_parse(raw));
    };

    let rest = &trimmed[pos + "points".len()..];
    let body = match rest.find(']') {
        Some(end) => &rest[..end],
        None => rest.split("points").next().unwrap_or(rest),
    };
    let body = body.trim_matches(|c: char| c == '[' || c.is_whitespace());

    let mut coords = Vec::new();
    for token in body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let v: f32 = token.parse().map_err(|_| Error::shape_parse(raw))?;
        coords.push(v);
    }

    if coords.is_empty() || coords.len() % 2 != 0 {
        return Err(Error::shape_parse(raw));
    }

    Ok(coords
        .chunks_exact(2)
        .map(|xy| Point2f::new(xy[0], xy[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use ky_core::{Error, Point2f};

    use super::parse_points;

    #[test]
    fn uses_only_the_first_list() {
        let pts = parse_points(
            "points[309,427, 366,503, 190,491] points1[1,1, 2,2] points2[3,3, 4,4]",
        )
        .expect("valid points");
        assert_eq!(
            pts,
            vec![
                Point2f::new(309.0, 427.0),
                Point2f::new(366.0, 503.0),
                Point2f::new(190.0, 491.0)
            ]
        );
    }

    #[test]
    fn tolerates_spacing_and_fractions() {
        let pts = parse_points("  points[ 0.5,1 ,10, 0 ] ").expect("valid points");
        assert_eq!(pts, vec![Point2f::new(0.5, 1.0), Point2f::new(10.0, 0.0)]);
    }

    #[test]
    fn missing_token_is_a_parse_error() {
        let err = parse_points("0,0 10,0 10,10").unwrap_err();
        assert!(matches!(err, Error::ShapeParse(_)));
    }

    #[test]
    fn odd_or_garbage_coordinates_are_rejected() {
        assert!(parse_points("points[1,2, 3]").is_err());
        assert!(parse_points("points[a,b]").is_err());
        assert!(parse_points("points[]").is_err());
    }
}
