use crate::dictionary::{Dictionary, DictionaryTerm};
use crate::error::{CatalogError, CatalogResult};
use crate::locale::header_language;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load a dictionary from a CSV file
///
/// The CSV file should have the following structure:
/// ```text
/// English,简体中文,ja
/// Running,跑步,ランニング
/// Outdoor Walk,户外步行,屋外ウォーキング
/// ```
///
/// The first row is the header. The first column holds the source text; every
/// other column is a language, named either by code or by native name.
/// The dictionary is named after the file stem.
///
/// # Errors
/// - File not found
/// - Invalid CSV
pub fn load_dictionary_from_file(path: &Path) -> CatalogResult<Dictionary> {
    if !path.exists() {
        return Err(CatalogError::DictionaryNotFound(path.to_path_buf()));
    }

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("dictionary")
        .to_string();

    let file = File::open(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    load_dictionary_from_reader(&name, file)
}

/// Load a dictionary from CSV data
///
/// Rows with fewer than two cells or an empty source are skipped, and so are
/// empty cells. Cells are trimmed.
pub fn load_dictionary_from_reader<R: Read>(name: &str, reader: R) -> CatalogResult<Dictionary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let csv_error = |source: csv::Error| CatalogError::Dictionary {
        name: name.to_string(),
        source,
    };

    let mut records = csv_reader.records();
    let Some(header) = records.next() else {
        return Ok(Dictionary::new(name, Vec::new()));
    };
    let header = header.map_err(csv_error)?;

    // Column index -> language code, skipping the source column
    let languages: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, cell)| !cell.trim().is_empty())
        .map(|(index, cell)| (index, header_language(cell)))
        .collect();

    let mut terms = Vec::new();
    for record in records {
        let record = record.map_err(csv_error)?;
        if record.len() < 2 {
            continue;
        }

        let source = record.get(0).unwrap_or_default().trim();
        if source.is_empty() {
            continue;
        }

        let translations = languages.iter().filter_map(|(index, code)| {
            record.get(*index).map(|cell| (code.clone(), cell))
        });
        terms.push(DictionaryTerm::new(source, translations));
    }

    let dictionary = Dictionary::new(name, terms);
    info!(
        dictionary = name,
        entries = dictionary.len(),
        "Loaded dictionary"
    );
    Ok(dictionary)
}

/// Load dictionaries in the given order
///
/// A file that is missing or fails to parse is logged and skipped; its error
/// is returned alongside the dictionaries that did load.
pub fn load_dictionaries(paths: &[PathBuf]) -> (Vec<Dictionary>, Vec<CatalogError>) {
    let mut dictionaries = Vec::new();
    let mut errors = Vec::new();

    for path in paths {
        match load_dictionary_from_file(path) {
            Ok(dictionary) => dictionaries.push(dictionary),
            Err(e) => {
                warn!("Skipping dictionary: {}", e);
                errors.push(e);
            }
        }
    }

    (dictionaries, errors)
}

/// Default output path for a translated catalog
///
/// `Localizable.xcstrings` → `Localizable_translated.xcstrings`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("catalog");
    let file_name = match input.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}_translated.{}", stem, ext),
        None => format!("{}_translated", stem),
    };
    input.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WORKOUTS: &str = "English,简体中文,ja,\nRunning,跑步,ランニング\nOutdoor Walk , 户外步行 ,\n,空,空\nYoga\n";

    #[test]
    fn test_load_from_reader() {
        let dictionary = load_dictionary_from_reader("workouts", WORKOUTS.as_bytes()).unwrap();
        assert_eq!(dictionary.name(), "workouts");
        assert_eq!(dictionary.len(), 2);

        let running = &dictionary.terms()[0];
        assert_eq!(running.source, "Running");
        assert_eq!(running.translation_for("zh-Hans"), Some("跑步"));
        assert_eq!(running.translation_for("ja"), Some("ランニング"));

        let walk = &dictionary.terms()[1];
        assert_eq!(walk.source, "Outdoor Walk");
        assert_eq!(walk.translation_for("zh-Hans"), Some("户外步行"));
        assert_eq!(walk.translation_for("ja"), None);
    }

    #[test]
    fn test_load_empty_reader() {
        let dictionary = load_dictionary_from_reader("empty", "".as_bytes()).unwrap();
        assert!(dictionary.is_empty());
    }

    #[test]
    fn test_load_from_file_uses_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AppleWatchWorkoutTypes.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(WORKOUTS.as_bytes()).unwrap();

        let dictionary = load_dictionary_from_file(&path).unwrap();
        assert_eq!(dictionary.name(), "AppleWatchWorkoutTypes");
        assert_eq!(dictionary.len(), 2);
    }

    #[test]
    fn test_load_dictionaries_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("terms.csv");
        std::fs::write(&present, "en,de\nSave,Sichern\n").unwrap();
        let missing = dir.path().join("missing.csv");

        let (dictionaries, errors) = load_dictionaries(&[missing, present]);
        assert_eq!(dictionaries.len(), 1);
        assert_eq!(dictionaries[0].name(), "terms");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CatalogError::DictionaryNotFound(_)));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/Localizable.xcstrings")),
            PathBuf::from("/tmp/Localizable_translated.xcstrings")
        );
        assert_eq!(
            default_output_path(Path::new("strings.json")),
            PathBuf::from("strings_translated.json")
        );
    }
}
