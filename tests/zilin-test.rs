use once_cell::sync::Lazy;
use zilin_rs::{Corpus, CorpusError, DictionaryType, Token, Zilin};

static ZILIN: Lazy<Zilin> = Lazy::new(|| {
    Zilin::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data")).unwrap()
});

fn values(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|token| token.value.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zilin_rs::CharacterDecomposition::{Composite, Leaf, Unknown};

    #[test]
    fn tokenize_prefers_longest_match() {
        let tokens = ZILIN.tokenize("你好吗");
        assert_eq!(values(&tokens), vec!["你好", "吗"]);
        assert_eq!(tokens[1].offset, 2);
        assert!(tokens.iter().all(|token| token.has_entries));
    }

    #[test]
    fn tokenize_mixed_text() {
        let input = "我爱你，中国人！ Hello world";
        let tokens = ZILIN.tokenize(input);
        assert_eq!(
            values(&tokens),
            vec!["我", "爱", "你", "，", "中国人", "！", " ", "Hello", " ", "world"]
        );
        let offsets: Vec<_> = tokens.iter().map(|token| token.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2, 3, 4, 7, 8, 9, 14, 15]);
        assert!(!tokens[3].has_entries);
        assert!(!tokens[7].has_entries);
        assert_eq!(tokens.iter().map(|t| t.value.as_str()).collect::<String>(), input);
    }

    #[test]
    fn tokenize_traditional_text() {
        let tokens = ZILIN.tokenize("我喜歡貓");
        assert_eq!(values(&tokens), vec!["我", "喜歡", "貓"]);
    }

    #[test]
    fn unknown_han_is_a_single_grapheme() {
        let tokens = ZILIN.tokenize("猫狗狗");
        assert_eq!(values(&tokens), vec!["猫", "狗", "狗"]);
        assert!(tokens[0].has_entries);
        assert!(!tokens[1].has_entries);
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(ZILIN.tokenize("").is_empty());
    }

    #[test]
    fn long_input_matches_short_input() {
        let line = "我爱你，中国人！ Hello world\n";
        let expected = ZILIN.tokenize(line);
        let graphemes = 21;

        let tokens = ZILIN.tokenize(&line.repeat(30));
        assert_eq!(tokens.len(), expected.len() * 30);
        for (i, token) in tokens.iter().enumerate() {
            let base = &expected[i % expected.len()];
            assert_eq!(token.value, base.value);
            assert_eq!(token.has_entries, base.has_entries);
            assert_eq!(token.offset, base.offset + graphemes * (i / expected.len()));
        }
    }

    #[test]
    fn tokens_with_entries_resolve() {
        for token in ZILIN.tokenize("你好吗？我喜歡吃。") {
            let found = !ZILIN.get_word(&token.value, DictionaryType::Simplified).is_empty()
                || !ZILIN.get_word(&token.value, DictionaryType::Traditional).is_empty();
            assert_eq!(found, token.has_entries, "{}", token.value);
        }
    }

    #[test]
    fn get_word_by_script() {
        let entries = ZILIN.get_word("你", DictionaryType::Simplified);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].english, "you (informal)");
        assert_eq!(entries[1].traditional, "妳");

        assert_eq!(ZILIN.get_word("你", DictionaryType::Traditional).len(), 1);
        assert!(ZILIN.get_word("狗", DictionaryType::Simplified).is_empty());
    }

    #[test]
    fn homophones_require_the_same_tone() {
        let words: Vec<_> = ZILIN
            .get_homophones("你", DictionaryType::Simplified)
            .into_iter()
            .map(|entry| entry.simplified)
            .collect();
        assert_eq!(words, vec!["拟"]);
        assert!(ZILIN
            .get_homophones("狗", DictionaryType::Simplified)
            .is_empty());
    }

    #[test]
    fn words_including_subslice() {
        let words: Vec<_> = ZILIN
            .get_words_including_subslice("好", 10, DictionaryType::Simplified)
            .into_iter()
            .map(|entry| entry.simplified)
            .collect();
        assert_eq!(words, vec!["你好", "好吃"]);
        assert_eq!(
            ZILIN
                .get_words_including_subslice("好", 1, DictionaryType::Simplified)
                .len(),
            1
        );
        let words: Vec<_> = ZILIN
            .get_words_including_subslice("國", 10, DictionaryType::Traditional)
            .into_iter()
            .map(|entry| entry.traditional)
            .collect();
        assert_eq!(words, vec!["中國", "中國人"]);
    }

    #[test]
    fn words_including_subslice_sort_by_strokes() {
        // 孩 has no character record, so 孩子 sorts after 女子 (3 + 3 strokes).
        let words: Vec<_> = ZILIN
            .get_words_including_subslice("子", 10, DictionaryType::Simplified)
            .into_iter()
            .map(|entry| entry.simplified)
            .collect();
        assert_eq!(words, vec!["女子", "孩子"]);

        // The limit applies in corpus order, before sorting.
        let words: Vec<_> = ZILIN
            .get_words_including_subslice("子", 1, DictionaryType::Simplified)
            .into_iter()
            .map(|entry| entry.simplified)
            .collect();
        assert_eq!(words, vec!["孩子"]);
    }

    #[test]
    fn every_entry_is_found_by_both_headwords() {
        let words = ZILIN.words();
        assert!(!words.is_empty());
        for entry in words.iter() {
            assert!(
                ZILIN
                    .get_word(&entry.simplified, DictionaryType::Simplified)
                    .contains(entry),
                "{}",
                entry.simplified
            );
            assert!(
                ZILIN
                    .get_word(&entry.traditional, DictionaryType::Traditional)
                    .contains(entry),
                "{}",
                entry.traditional
            );
        }
    }

    #[test]
    fn character_records() {
        let entry = ZILIN.get_character('好').unwrap();
        assert_eq!(entry.strokes, 6);
        assert_eq!(entry.radical.as_deref(), Some("女"));
        assert_eq!(entry.pinyin, vec!["hǎo", "hào"]);
        assert!(ZILIN.get_character('狗').is_none());

        assert_eq!(ZILIN.stroke_count("好女"), Some(9));
        assert_eq!(ZILIN.stroke_count("好马"), None);
    }

    #[test]
    fn decompose_characters() {
        assert_eq!(
            ZILIN.decompose('好'),
            Composite {
                kind: '⿰',
                value: Some('好'),
                parts: vec![Leaf('女'), Leaf('子')],
            }
        );
        assert_eq!(
            ZILIN.decompose('妈'),
            Composite {
                kind: '⿰',
                value: Some('妈'),
                parts: vec![Leaf('女'), Leaf('马')],
            }
        );
        assert_eq!(ZILIN.decompose('女'), Leaf('女'));
        assert_eq!(ZILIN.decompose('狗'), Unknown);
    }

    #[test]
    fn cyclic_decomposition_terminates() {
        assert_eq!(
            ZILIN.decompose('甲'),
            Composite {
                kind: '⿱',
                value: Some('甲'),
                parts: vec![
                    Composite {
                        kind: '⿱',
                        value: Some('乙'),
                        parts: vec![Leaf('甲'), Leaf('一')],
                    },
                    Leaf('十'),
                ],
            }
        );
    }

    #[test]
    fn characters_including_component() {
        let simplified: Vec<_> = ZILIN
            .get_characters_including_component('女', DictionaryType::Simplified)
            .into_iter()
            .map(|entry| entry.character)
            .collect();
        assert_eq!(simplified, vec!['好', '妈']);

        let traditional: Vec<_> = ZILIN
            .get_characters_including_component('女', DictionaryType::Traditional)
            .into_iter()
            .map(|entry| entry.character)
            .collect();
        assert_eq!(traditional, vec!['好']);

        // 甲 is built from 乙 but is not a dictionary word.
        assert!(ZILIN
            .get_characters_including_component('乙', DictionaryType::Simplified)
            .is_empty());
    }

    #[test]
    fn word_frequencies() {
        assert_eq!(
            ZILIN.get_word_frequencies(&["我", "你好", "猫"]),
            vec![Some(1), Some(5), None]
        );
        let scores = ZILIN.get_word_frequency_scores(&["我", "你好", "狗"]);
        assert_eq!(scores[0], 100);
        assert!(scores[1] > 0 && scores[1] < 100);
        assert_eq!(scores[2], 0);
    }

    #[test]
    fn sentences_including_word() {
        let sentences = ZILIN.get_sentences_including_word("喜欢", 10, DictionaryType::Simplified);
        let texts: Vec<_> = sentences.iter().map(|pair| pair.sentence.as_str()).collect();
        assert_eq!(texts, vec!["我喜欢猫。", "妈妈喜欢吃。"]);
        assert_eq!(sentences[0].translation, "I like cats.");

        let sentences = ZILIN.get_sentences_including_word("喜歡", 1, DictionaryType::Traditional);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].sentence, "我喜歡貓。");

        let sentences = ZILIN.get_sentences_including_word("吗", 10, DictionaryType::Simplified);
        assert_eq!(sentences[0].sentence, "你好吗？");
    }

    #[test]
    fn similar_words_rank_by_shared_meaning() {
        let similar = ZILIN.get_similar_words("快乐", 10, DictionaryType::Simplified);
        let words: Vec<_> = similar.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, vec!["愉快", "高兴"]);
        assert!(ZILIN
            .get_similar_words("中国", 10, DictionaryType::Simplified)
            .is_empty());
    }

    #[test]
    fn dispatch_json_round_trip() {
        let json = ZILIN
            .dispatch_json(r#"{"fn":"tokenize","args":{"text":"你好吗"}}"#)
            .unwrap();
        assert_eq!(
            json,
            r#"[{"value":"你好","offset":0,"hasEntries":true},{"value":"吗","offset":2,"hasEntries":true}]"#
        );

        let json = ZILIN
            .dispatch_json(r#"{"fn":"getWordFrequencies","args":{"words":["我","猫"]}}"#)
            .unwrap();
        assert_eq!(json, "[1,null]");

        let json = ZILIN
            .dispatch_json(r#"{"fn":"decompose","args":{"character":"女"}}"#)
            .unwrap();
        assert_eq!(json, r#""女""#);

        assert!(ZILIN.dispatch_json(r#"{"fn":"getWord"}"#).is_err());
    }

    #[test]
    fn load_errors() {
        assert!(matches!(
            Zilin::from_texts("", "", None, None),
            Err(CorpusError::EmptyCorpus(_))
        ));
        assert!(matches!(
            Zilin::load(&Corpus::new("# header only\n", "", None, None)),
            Err(CorpusError::NoEntries(_))
        ));
        assert!(matches!(
            Zilin::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/no-such-dir")),
            Err(CorpusError::Io { .. })
        ));
    }
}
