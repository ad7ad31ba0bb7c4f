/*!
 * Tests for source file discovery and filename parsing
 */

use anyhow::Result;
use glossfill::file_utils::{FileManager, SourceLabels, DEFAULT_CATEGORY};

use crate::common;

#[test]
fn test_sourceLabels_withOrdinalSuffix_shouldDropOrdinal() {
    let labels = SourceLabels::from_filename("en-CET4_2.json", DEFAULT_CATEGORY);
    assert_eq!(labels.language, "en");
    assert_eq!(labels.category, "CET4");
}

#[test]
fn test_sourceLabels_withoutCategory_shouldUseDefault() {
    let labels = SourceLabels::from_filename("prog.json", DEFAULT_CATEGORY);
    assert_eq!(labels.language, "prog");
    assert_eq!(labels.category, "基础");
}

#[test]
fn test_sourceLabels_withDashedCategory_shouldSplitOnFirstDash() {
    let labels = SourceLabels::from_filename("英语-GRE-核心.json", DEFAULT_CATEGORY);
    assert_eq!(labels.language, "英语");
    assert_eq!(labels.category, "GRE-核心");
}

#[test]
fn test_sourceLabels_withOrdinalInsideCategory_shouldOnlyStripTrailing() {
    let labels = SourceLabels::from_filename("de-A1_2_extra.json", DEFAULT_CATEGORY);
    assert_eq!(labels.category, "A1_2_extra");
}

#[test]
fn test_findFiles_withMixedEntries_shouldReturnSortedJsonOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();

    common::create_test_file(dir, "ja-N5.json", "[]")?;
    common::create_test_file(dir, "en-CET4.JSON", "[]")?;
    common::create_test_file(dir, "notes.txt", "not a word list")?;
    std::fs::create_dir(dir.join("nested"))?;
    common::create_test_file(&dir.join("nested"), "de-A1.json", "[]")?;

    let files = FileManager::find_files(dir, "json")?;
    let names: Vec<String> = files.iter().map(FileManager::file_name).collect();

    assert_eq!(names, vec!["en-CET4.JSON", "ja-N5.json"]);
    Ok(())
}

#[test]
fn test_findFiles_withDottedExtension_shouldMatchSameFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "en-CET6.json", "[]")?;

    let files = FileManager::find_files(temp_dir.path(), ".json")?;
    assert_eq!(files.len(), 1);
    Ok(())
}

#[test]
fn test_readToString_withMissingFile_shouldMentionPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("missing.json");

    let err = FileManager::read_to_string(&missing).unwrap_err();
    assert!(format!("{}", err).contains("missing.json"));
    assert!(!FileManager::dir_exists(&missing));
    assert!(FileManager::dir_exists(temp_dir.path()));
    Ok(())
}
