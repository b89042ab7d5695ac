/*!
 * End-to-end tests: JSON transcript in, translated JSON transcript out.
 */

use transcript_translator::providers::mock::MockCaller;
use transcript_translator::{IndexedTranslation, Transcript, TranscriptError, Translator};

use crate::common::{create_temp_dir, create_test_file, init_test_logging, test_resource_path};

#[tokio::test]
async fn test_workflow_withFixtureFile_shouldTranslateArabicLinesAndKeepOrder() {
    init_test_logging();
    let file = std::fs::File::open(test_resource_path("arabic_conversation.json")).unwrap();
    let mut transcript = Transcript::from_reader(std::io::BufReader::new(file)).unwrap();
    transcript.validate().unwrap();
    let original = transcript.clone();

    // Small budget so the fixture spans several prompts
    let caller = MockCaller::echo();
    let translator = Translator::new(caller.clone(), 200);
    let outcome = translator.translate(&mut transcript).await.unwrap();

    assert!(caller.call_count() > 1);
    assert_eq!(outcome.report().unwrap().applied, 6);

    let json = transcript.to_json_pretty().unwrap();
    let decoded = Transcript::from_json(&json).unwrap();
    assert_eq!(decoded.len(), original.len());
    assert_eq!(decoded[2].sentence, "Okay, then explain the numbers.");
    assert_eq!(decoded[6].sentence, "[door closes]");
    assert!(decoded[0].sentence.starts_with("[EN] "));
    for (before, after) in original.iter().zip(decoded.iter()) {
        assert_eq!(before.speaker, after.speaker);
        assert_eq!(before.time, after.time);
    }
}

#[tokio::test]
async fn test_workflow_greetingScenario_shouldMatchExpectedJson() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "input.json",
        r#"[{"speaker":"A","time":"00:01","sentence":"مرحبا"},{"speaker":"B","time":"00:02","sentence":"hello"}]"#,
    ).unwrap();

    let mut transcript = Transcript::from_json(&std::fs::read_to_string(path).unwrap()).unwrap();
    let translator = Translator::with_default_budget(MockCaller::fixed(vec![IndexedTranslation::new(0, "Hello")]));
    translator.translate(&mut transcript).await.unwrap();

    let value = serde_json::to_value(&transcript).unwrap();
    assert_eq!(value, serde_json::json!([
        {"speaker": "A", "time": "00:01", "sentence": "Hello"},
        {"speaker": "B", "time": "00:02", "sentence": "hello"}
    ]));
}

#[test]
fn test_workflow_withEmptySpeaker_shouldBeRejectedAtIngestion() {
    let transcript = Transcript::from_json(r#"[{"speaker":"","time":"00:01","sentence":"مرحبا"}]"#).unwrap();

    assert!(matches!(
        transcript.validate(),
        Err(TranscriptError::EmptyField { index: 0, field: "speaker" })
    ));
}
