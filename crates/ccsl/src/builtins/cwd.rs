use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;

/// Basename of the working directory.
pub struct CwdProducer;

impl Producer for CwdProducer {
    fn id(&self) -> &str {
        super::CWD
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move { cwd_segment(input) })
    }
}

pub fn cwd_segment(input: &ProducerInput) -> Segment {
    let Some(dir) = super::current_dir(&input.context) else {
        return Segment::default();
    };
    // The root directory has no basename.
    let name = match dir.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => dir.to_string_lossy().into_owned(),
    };
    if name.is_empty() {
        return Segment::default();
    }
    Segment::text(format!("{}{name}", input.icon("📁"))).with_priority(80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccsl_core::producer::ProducerOptions;

    fn render(raw: &str) -> Segment {
        cwd_segment(&ProducerInput::from_raw(raw.as_bytes(), ProducerOptions::default()))
    }

    #[test]
    fn basename_of_current_dir() {
        let seg = render(r#"{"workspace":{"current_dir":"/home/me/proj"}}"#);
        assert_eq!(seg.text, "proj");
        assert_eq!(seg.priority, 80);
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(render(r#"{"workspace":{"current_dir":"/home/me/proj/"}}"#).text, "proj");
    }

    #[test]
    fn root_shows_full_path() {
        assert_eq!(render(r#"{"workspace":{"current_dir":"/"}}"#).text, "/");
    }

    #[test]
    fn falls_back_to_process_cwd() {
        let expected = std::env::current_dir().unwrap();
        let name = expected.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(render("{}").text, name);
    }
}
