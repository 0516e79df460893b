//! Just enough `multipart/form-data` to read text fields.

use crate::util::trim_ows;

/// `boundary` parameter of a multipart `Content-Type`.
pub(crate) fn boundary(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| trim_ows(key).eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| trim_ows(value).trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// First non-file field called `name`.
pub(crate) fn find_field(body: &[u8], boundary: &str, name: &str) -> Option<String> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();
    let mut pos = find(body, delimiter, 0)? + delimiter.len();

    loop {
        let rest = body.get(pos..)?;
        if rest.starts_with(b"--") {
            return None;
        }
        let start = pos + rest.strip_prefix(b"\r\n").map(|_| 2)?;
        let next = find(body, delimiter, start)?;
        let part = &body[start..next];
        let part = part.strip_suffix(b"\r\n").unwrap_or(part);

        let (headers, content) = match part.strip_prefix(b"\r\n") {
            Some(content) => (&[][..], content),
            None => {
                let end = find(part, b"\r\n\r\n", 0)?;
                (&part[..end], &part[end + 4..])
            }
        };

        if let Some((field, is_file)) = disposition(headers) {
            if field == name && !is_file {
                return String::from_utf8(content.to_vec()).ok();
            }
        }
        pos = next + delimiter.len();
    }
}

/// Field name from `Content-Disposition`, and whether the part carries a file.
fn disposition(headers: &[u8]) -> Option<(&str, bool)> {
    let headers = std::str::from_utf8(headers).ok()?;
    let value = headers.split("\r\n").find_map(|line| {
        line.split_once(':')
            .filter(|(key, _)| trim_ows(key).eq_ignore_ascii_case("content-disposition"))
            .map(|(_, value)| value)
    })?;

    let mut field = None;
    let mut is_file = false;
    for param in value.split(';').skip(1) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = trim_ows(key);
        if key.eq_ignore_ascii_case("name") {
            field = Some(trim_ows(raw).trim_matches('"'));
        } else if key.eq_ignore_ascii_case("filename") {
            is_file = true;
        }
    }
    field.map(|field| (field, is_file))
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|index| index + from)
}

#[cfg(test)]
#[path = "multipart_test.rs"]
mod multipart_test;
