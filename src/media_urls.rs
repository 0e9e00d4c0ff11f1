//! Localisation of media-store URLs in site data
//!
//! The site data served to browsers links sound files and contributor images
//! on the media store. For an offline copy of the site these links are
//! rewritten to relative paths. The rewrite walks the JSON structure and only
//! touches string values, so keys and non-URL strings are never altered.

use crate::soundfile_name::SoundfileName;
use serde_json::Value;
use url::Url;

/// Extensions of sound files referenced from the site
const SITE_SOUND_EXTENSIONS: [&str; 2] = ["mp3", "ogg"];

/// Replace sound file URLs under `base_url` with `{local_prefix}/{variety}/{file}`
///
/// Only URLs whose last path segment is a sound file name with an `mp3` or
/// `ogg` extension (in any case) are rewritten. Returns the rewritten value
/// and the number of replaced strings.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use soundcomparisons::media_urls::rewrite_media_urls;
/// use url::Url;
///
/// let base = Url::parse("https://cdstar.shh.mpg.de").unwrap();
/// let data = json!({"soundPaths": [
///     "https://cdstar.shh.mpg.de/bitstreams/EAEA0-1/Eng_101_house.mp3"
/// ]});
/// let (data, count) = rewrite_media_urls(data, &base, "sound");
/// assert_eq!(count, 1);
/// assert_eq!(data["soundPaths"][0], "sound/Eng/Eng_101_house.mp3");
/// ```
pub fn rewrite_media_urls(json: Value, base_url: &Url, local_prefix: &str) -> (Value, usize) {
    rewrite_strings(json, &mut |s: &str| {
        let file = last_segment_under(s, base_url)?;
        let name = SoundfileName::parse(&file).ok()?;
        let ext = name.extension()?;
        if !SITE_SOUND_EXTENSIONS
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
        {
            return None;
        }
        Some(format!("{}/{}/{}", local_prefix, name.variety(), file))
    })
}

/// Replace any URL under `base_url` with `{local_prefix}/{last path segment}`
///
/// Used for contributor images. Returns the rewritten value and the number
/// of replaced strings.
pub fn rewrite_image_urls(json: Value, base_url: &Url, local_prefix: &str) -> (Value, usize) {
    rewrite_strings(json, &mut |s: &str| {
        let file = last_segment_under(s, base_url)?;
        Some(format!("{}/{}", local_prefix, file))
    })
}

fn rewrite_strings(
    value: Value,
    rewrite: &mut impl FnMut(&str) -> Option<String>,
) -> (Value, usize) {
    match value {
        Value::String(s) => match rewrite(&s) {
            Some(replaced) => (Value::String(replaced), 1),
            None => (Value::String(s), 0),
        },
        Value::Array(items) => {
            let mut count = 0;
            let items = items
                .into_iter()
                .map(|item| {
                    let (item, n) = rewrite_strings(item, &mut *rewrite);
                    count += n;
                    item
                })
                .collect();
            (Value::Array(items), count)
        }
        Value::Object(map) => {
            let mut count = 0;
            let map = map
                .into_iter()
                .map(|(key, item)| {
                    let (item, n) = rewrite_strings(item, &mut *rewrite);
                    count += n;
                    (key, item)
                })
                .collect();
            (Value::Object(map), count)
        }
        other => (other, 0),
    }
}

/// Last path segment of `s` if it is an http(s) URL on the host of `base`
/// with a path below the base path
fn last_segment_under(s: &str, base: &Url) -> Option<String> {
    if !(s.starts_with("http://") || s.starts_with("https://")) {
        return None;
    }
    let url = Url::parse(s).ok()?;
    if url.host_str()? != base.host_str()? {
        return None;
    }
    if let Some(port) = base.port() {
        if url.port_or_known_default() != Some(port) {
            return None;
        }
    }

    let base_path = base.path().trim_end_matches('/');
    let rest = url.path().strip_prefix(base_path)?;
    if !rest.starts_with('/') {
        return None;
    }

    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        None
    } else {
        Some(last.to_string())
    }
}
