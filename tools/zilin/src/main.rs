use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use clap::{Arg, ArgAction, Command};
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use zilin_rs::{DictionaryType, Request, Zilin};

const COMMAND_LIST: [&str; 11] = [
    "tokenize",
    "getWord",
    "getCharacter",
    "decompose",
    "getWordFrequencies",
    "getWordFrequencyScores",
    "getSentencesIncludingWord",
    "getHomophones",
    "getSimilarWords",
    "getWordsIncludingSubslice",
    "getCharactersIncludingComponent",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m";
    const RESET: &str = "\x1B[0m";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let matches = Command::new("Zilin")
        .arg(
            Arg::new("data_dir")
                .short('d')
                .long("data-dir")
                .value_name("dir")
                .default_value("data")
                .help("Load corpus files from <dir>."),
        )
        .arg(
            Arg::new("bundle")
                .short('b')
                .long("bundle")
                .value_name("file")
                .conflicts_with("data_dir")
                .help("Load a corpus bundle built by zilin-pack."),
        )
        .arg(
            Arg::new("command")
                .short('c')
                .long("command")
                .value_name("fn")
                .default_value("tokenize")
                .help("Query to run: [tokenize|getWord|getCharacter|decompose|getWordFrequencies|getSentencesIncludingWord|getHomophones|getSimilarWords|getWordsIncludingSubslice|getCharactersIncludingComponent]"),
        )
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .value_name("text")
                .help("Query text. Read from --input or stdin when omitted."),
        )
        .arg(
            Arg::new("request")
                .short('r')
                .long("request")
                .value_name("json")
                .conflicts_with_all(["command", "query"])
                .help("Run a raw JSON request, e.g. {\"fn\":\"getWord\",\"args\":{\"word\":\"你好\"}}"),
        )
        .arg(
            Arg::new("traditional")
                .short('t')
                .long("traditional")
                .action(ArgAction::SetTrue)
                .help("Query traditional headwords instead of simplified."),
        )
        .arg(
            Arg::new("limit")
                .short('l')
                .long("limit")
                .value_name("n")
                .value_parser(clap::value_parser!(usize))
                .default_value("10")
                .help("Maximum number of results for list queries."),
        )
        .arg(
            Arg::new("pretty")
                .short('p')
                .long("pretty")
                .action(ArgAction::SetTrue)
                .help("Pretty-print the JSON result."),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read query text from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write the JSON result to <file>."),
        )
        .arg(
            Arg::new("in_enc")
                .long("in-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for input"),
        )
        .about(format!(
            "{BLUE}Zilin: Command Line Chinese Dictionary and Tokenizer{RESET}"
        ))
        .get_matches();

    let zilin = match matches.get_one::<String>("bundle") {
        Some(bundle) => Zilin::from_bundle(bundle)?,
        None => {
            let data_dir = matches
                .get_one::<String>("data_dir")
                .map(String::as_str)
                .unwrap_or("data");
            Zilin::from_dir(data_dir)?
        }
    };

    let output: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(file_name) => Box::new(File::create(file_name)?),
        None => Box::new(io::stdout()),
    };
    let mut output_buf = BufWriter::new(output);
    let pretty = matches.get_flag("pretty");

    let response = match matches.get_one::<String>("request") {
        Some(json) => {
            let request: Request = serde_json::from_str(json)?;
            zilin.dispatch(request)
        }
        None => {
            let command = matches
                .get_one::<String>("command")
                .map(String::as_str)
                .unwrap_or("tokenize");
            if !COMMAND_LIST.contains(&command) {
                eprintln!("Invalid command: {command}");
                eprintln!("Valid commands are: {}", COMMAND_LIST.join("|"));
                return Ok(());
            }
            let query = match matches.get_one::<String>("query") {
                Some(query) => query.clone(),
                None => read_input(
                    matches.get_one::<String>("input").map(String::as_str),
                    matches
                        .get_one::<String>("in_enc")
                        .map(String::as_str)
                        .unwrap_or("UTF-8"),
                )?,
            };
            let script = DictionaryType::from(!matches.get_flag("traditional"));
            let limit = matches.get_one::<usize>("limit").copied().unwrap_or(10);
            let request = build_request(command, query, script, limit)?;
            debug!(?request, "dispatching");
            zilin.dispatch(request)
        }
    };

    if pretty {
        serde_json::to_writer_pretty(&mut output_buf, &response)?;
    } else {
        serde_json::to_writer(&mut output_buf, &response)?;
    }
    writeln!(output_buf)?;
    output_buf.flush()?;

    Ok(())
}

fn read_input(input_file: Option<&str>, in_enc: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut bytes = Vec::new();
    match input_file {
        Some(file_name) => {
            File::open(file_name)?.read_to_end(&mut bytes)?;
        }
        None => {
            io::stdin().read_to_end(&mut bytes)?;
        }
    }

    if in_enc.eq_ignore_ascii_case("UTF-8") {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    let encoding = Encoding::for_label(in_enc.as_bytes())
        .ok_or_else(|| format!("Unsupported input encoding: {in_enc}"))?;
    let mut decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(&*bytes);
    let mut text = String::new();
    decoder.read_to_string(&mut text)?;
    Ok(text)
}

fn build_request(
    command: &str,
    query: String,
    script: DictionaryType,
    limit: usize,
) -> Result<Request, Box<dyn std::error::Error>> {
    let word = || query.trim().to_owned();
    let character = || {
        let mut chars = query.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(format!("{command} expects a single character, got {:?}", query.trim())),
        }
    };

    Ok(match command {
        "tokenize" => Request::Tokenize { text: query.clone() },
        "getWord" => Request::GetWord {
            word: word(),
            script,
        },
        "getCharacter" => Request::GetCharacter {
            character: character()?,
        },
        "decompose" => Request::Decompose {
            character: character()?,
        },
        "getWordFrequencies" => Request::GetWordFrequencies {
            words: query.split_whitespace().map(str::to_owned).collect(),
        },
        "getWordFrequencyScores" => Request::GetWordFrequencyScores {
            words: query.split_whitespace().map(str::to_owned).collect(),
        },
        "getSentencesIncludingWord" => Request::GetSentencesIncludingWord {
            word: word(),
            limit,
            script,
        },
        "getHomophones" => Request::GetHomophones {
            word: word(),
            script,
        },
        "getSimilarWords" => Request::GetSimilarWords {
            word: word(),
            limit,
            script,
        },
        "getWordsIncludingSubslice" => Request::GetWordsIncludingSubslice {
            substring: word(),
            limit,
            script,
        },
        "getCharactersIncludingComponent" => Request::GetCharactersIncludingComponent {
            component: character()?,
            script,
        },
        other => return Err(format!("Invalid command: {other}").into()),
    })
}
