use cifra_extract::{
    ChordFileSink, CleanOptions, ContentOutcome, ExtractError, RawMarkup, Sink, SinkFormat,
    extract, parse_chord_file, parse_chord_json,
};

const URL: &str = "https://www.cifraclub.com.br/simon-garfunkel/the-sound-of-silence/";

fn page() -> RawMarkup {
    RawMarkup::from(
        r##"<!DOCTYPE html>
<html>
<head><title>The Sound of Silence - Cifra Club</title></head>
<body>
  <div class="g-side-ad"><pre>advert</pre></div>
  <div class="cifra">
    <h1 class="t1">The Sound of Silence</h1>
    <h2 class="t3"><a href="/simon-garfunkel/" title="Simon &amp; Garfunkel">Simon &amp; Garfunkel</a></h2>
    <div id="side-tom"><span id="cifra_tom">Tom: <a class="js-modal-trigger" href="#">Dm</a></span></div>
    <div class="cifra_cnt g-fix cifra-mono">
<pre>[Intro] <b>Dm</b>

<span class="tablatura"><span class="cnt">E|-----------------|
B|-----3-------3---|
G|---2---2---2---2-|
D|-0-------0-------|</span></span>

[Primeira Parte]

<b>Dm</b>                  <b>C</b>
   Hello darkness, my old friend
                           <b>Dm</b>
I've come to talk with you again



<b>Bb</b>        <b>F</b>
   Because a vision softly creeping
</pre>
    </div>
  </div>
</body>
</html>"##,
    )
}

#[test]
fn realistic_page_end_to_end() {
    let ex = extract(&page(), URL, &CleanOptions::default());

    assert_eq!(ex.metadata.title, "The Sound of Silence");
    assert_eq!(ex.metadata.artist, "Simon & Garfunkel");
    assert_eq!(ex.metadata.key, "D");

    let sheet = ex.into_sheet().expect("sheet");
    let expected = "[Intro] Dm\n\n\
                    [Primeira Parte]\n\n\
                    Dm                  C\n   \
                    Hello darkness, my old friend\n                           \
                    Dm\n\
                    I've come to talk with you again\n\n\
                    Bb        F\n   \
                    Because a vision softly creeping\n";
    assert_eq!(sheet.content, expected);
    assert!(!sheet.content.contains('|'));
    assert!(!sheet.content.contains("---"));
}

#[test]
fn bare_page_reports_not_found_distinctly() {
    let ex = extract(
        &RawMarkup::from("<html><body><p>letra</p></body></html>"),
        URL,
        &CleanOptions::default(),
    );
    assert_eq!(ex.outcome, ContentOutcome::NotFound);
    let not_found = ex.status_message();
    assert_eq!(not_found, ExtractError::ChordBlockNotFound.user_message());
    assert_ne!(not_found, ExtractError::EmptyContent.user_message());
}

#[test]
fn chords_artifact_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let sheet = extract(&page(), URL, &CleanOptions::default())
        .into_sheet()
        .unwrap();

    let sink = ChordFileSink::new(tmp.path().join("out"), SinkFormat::Chords);
    let path = sink.persist(&sheet).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "Simon  Garfunkel - The Sound of Silence.chords"
    );

    let back = parse_chord_file(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back.metadata, sheet.metadata);
    assert_eq!(back.content, sheet.content);
    assert_eq!(back.source_url, URL);
    assert_eq!(back.extracted_at.timestamp(), sheet.extracted_at.timestamp());
}

#[test]
fn json_artifact_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let sheet = extract(&page(), URL, &CleanOptions::default())
        .into_sheet()
        .unwrap();

    let path = ChordFileSink::new(tmp.path(), SinkFormat::Json)
        .persist(&sheet)
        .unwrap();
    assert_eq!(path.extension().unwrap(), "json");

    let back = parse_chord_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, sheet);
}

#[test]
fn unwritable_target_is_a_write_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("file");
    std::fs::write(&blocker, "x").unwrap();

    let sheet = extract(&page(), URL, &CleanOptions::default())
        .into_sheet()
        .unwrap();
    let err = ChordFileSink::new(blocker.join("sub"), SinkFormat::Chords)
        .persist(&sheet)
        .unwrap_err();
    assert!(matches!(err, cifra_extract::SinkError::WriteFailed { .. }));
}
