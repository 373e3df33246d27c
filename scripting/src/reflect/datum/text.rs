//! Textual forms of datum values.
//!
//! Integers and floats use plain decimal text (floats with six fractional digits), strings are
//! verbatim, vectors are `bvec4(x, y, z, w)` and matrices are row-major
//! `mat4x4((m00, m01, m02, m03), (m10, ...), (m20, ...), (m30, ...))`. Parsing is lenient about
//! whitespace.

use glam::{Mat4, Vec4};

use crate::{
    error::{Error, Result},
    reflect::Kind,
};

pub(crate) fn format_float(value: f32) -> String {
    format!("{value:.6}")
}

pub(crate) fn format_vector(value: Vec4) -> String {
    format!(
        "bvec4({}, {}, {}, {})",
        format_float(value.x),
        format_float(value.y),
        format_float(value.z),
        format_float(value.w)
    )
}

pub(crate) fn format_matrix(value: Mat4) -> String {
    let rows = (0..4)
        .map(|i| {
            let row = value.row(i);
            format!(
                "({}, {}, {}, {})",
                format_float(row.x),
                format_float(row.y),
                format_float(row.z),
                format_float(row.w)
            )
        })
        .collect::<Vec<_>>();
    format!("mat4x4({})", rows.join(", "))
}

pub(crate) fn parse_integer(text: &str) -> Result<i32> {
    text.trim()
        .parse()
        .map_err(|_| parse_error(Kind::Integer, text))
}

pub(crate) fn parse_float(text: &str) -> Result<f32> {
    text.trim()
        .parse()
        .map_err(|_| parse_error(Kind::Float, text))
}

pub(crate) fn parse_vector(text: &str) -> Result<Vec4> {
    let inner = strip_call(text.trim(), "bvec4").ok_or_else(|| parse_error(Kind::Vector, text))?;
    let components = parse_components(inner).ok_or_else(|| parse_error(Kind::Vector, text))?;
    Ok(Vec4::from_array(components))
}

pub(crate) fn parse_matrix(text: &str) -> Result<Mat4> {
    let error = || parse_error(Kind::Matrix, text);
    let mut rest = strip_call(text.trim(), "mat4x4").ok_or_else(error)?.trim();

    let mut rows = [[0.0f32; 4]; 4];
    for (i, row) in rows.iter_mut().enumerate() {
        if i > 0 {
            rest = rest.strip_prefix(',').ok_or_else(error)?.trim_start();
        }
        let body = rest.strip_prefix('(').ok_or_else(error)?;
        let close = body.find(')').ok_or_else(error)?;
        *row = parse_components(&body[..close]).ok_or_else(error)?;
        rest = body[close + 1..].trim_start();
    }
    if !rest.is_empty() {
        return Err(error());
    }

    // glam stores columns; the text is row-major.
    Ok(Mat4::from_cols_array_2d(&rows).transpose())
}

/// `name(inner)` -> `inner`.
fn strip_call<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    text.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_components(text: &str) -> Option<[f32; 4]> {
    let mut components = [0.0f32; 4];
    let mut parts = text.split(',');
    for component in components.iter_mut() {
        *component = parts.next()?.trim().parse().ok()?;
    }
    parts.next().is_none().then_some(components)
}

fn parse_error(kind: Kind, text: &str) -> Error {
    Error::Parse {
        kind,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_has_six_fractional_digits() {
        assert_eq!(format_float(2.5), "2.500000");
        assert_eq!(format_float(-1.0), "-1.000000");
    }

    #[test]
    fn vector_text() {
        // Given
        let vector = Vec4::new(1.0, 2.0, 3.0, 4.0);

        // When
        let text = format_vector(vector);

        // Then
        assert_eq!(text, "bvec4(1.000000, 2.000000, 3.000000, 4.000000)");
        assert_eq!(parse_vector(&text).unwrap(), vector);
        assert_eq!(parse_vector("bvec4(1,2,3,4)").unwrap(), vector);
        assert_eq!(parse_vector("  bvec4( 1 , 2,3 ,4 ) ").unwrap(), vector);
    }

    #[test]
    fn malformed_vectors_fail() {
        assert!(parse_vector("vec4(1, 2, 3, 4)").is_err());
        assert!(parse_vector("bvec4(1, 2, 3)").is_err());
        assert!(parse_vector("bvec4(1, 2, 3, 4, 5)").is_err());
        assert!(parse_vector("bvec4(1, two, 3, 4)").is_err());
    }

    #[test]
    fn matrix_text_is_row_major() {
        // Given
        let matrix = Mat4::from_cols_array_2d(&[
            [1.0, 5.0, 9.0, 13.0],
            [2.0, 6.0, 10.0, 14.0],
            [3.0, 7.0, 11.0, 15.0],
            [4.0, 8.0, 12.0, 16.0],
        ]);

        // When
        let text = format_matrix(matrix);

        // Then
        assert!(text.starts_with("mat4x4((1.000000, 2.000000, 3.000000, 4.000000), (5.000000"));
        assert_eq!(parse_matrix(&text).unwrap(), matrix);
        assert_eq!(
            parse_matrix("mat4x4((1,2,3,4),(5,6,7,8),(9,10,11,12),(13,14,15,16))").unwrap(),
            matrix
        );
    }

    #[test]
    fn malformed_matrices_fail() {
        assert!(parse_matrix("mat4x4((1,2,3,4),(5,6,7,8),(9,10,11,12))").is_err());
        assert!(parse_matrix("mat4x4((1,2,3,4),(5,6,7,8),(9,10,11,12),(13,14,15,16)) x").is_err());
        assert!(parse_matrix("bvec4(1,2,3,4)").is_err());
    }

    #[test]
    fn scalars_trim_whitespace() {
        assert_eq!(parse_integer(" 42 ").unwrap(), 42);
        assert_eq!(parse_float("2.5").unwrap(), 2.5);
        assert!(matches!(
            parse_integer("4.5"),
            Err(Error::Parse {
                kind: Kind::Integer,
                ..
            })
        ));
    }
}
