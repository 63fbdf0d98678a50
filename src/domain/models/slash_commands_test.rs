use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    let text = "";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_space_only() {
    let text = " ";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_single_slash() {
    let text = "/";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_invalid_prefix() {
    let text = "!q";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_plain_text() {
    let text = "Tell me about llamas";
    assert!(SlashCommand::parse(text).is_none());
}

#[test]
fn it_is_short_quit() {
    let cmd = SlashCommand::parse("/q").unwrap();
    assert!(cmd.is_quit());
}
#[test]
fn it_is_quit() {
    let cmd = SlashCommand::parse("/quit").unwrap();
    assert!(cmd.is_quit());
}
#[test]
fn it_is_exit() {
    let cmd = SlashCommand::parse("/exit").unwrap();
    assert!(cmd.is_quit());
}
#[test]
fn it_is_not_is_quit() {
    let cmd = SlashCommand::parse("/ml").unwrap();
    assert!(!cmd.is_quit());
}

#[test]
fn it_is_model_list() {
    let cmd = SlashCommand::parse("/modellist").unwrap();
    assert!(cmd.is_model_list());
}
#[test]
fn it_is_model_set_with_args() {
    let cmd = SlashCommand::parse("/model llama3-8b-8192").unwrap();
    assert!(cmd.is_model_set());
    assert_eq!(cmd.args, vec!["llama3-8b-8192".to_string()]);
}

#[test]
fn it_is_clear() {
    let cmd = SlashCommand::parse("/clear").unwrap();
    assert!(cmd.is_clear());
}

#[test]
fn it_is_stream_toggle() {
    let cmd = SlashCommand::parse("/stream off").unwrap();
    assert!(cmd.is_stream_toggle());
    assert_eq!(cmd.args, vec!["off".to_string()]);
}

#[test]
fn it_is_help() {
    let cmd = SlashCommand::parse("/help").unwrap();
    assert!(cmd.is_help());
}
