/*!
# Block Iteration Tests

Context rules, iteration-count modes and conditional blocks, exercised
through full templates.
*/

use genxml::Template;

fn compile(text: &str) -> Template {
    Template::parse_str(text).expect("template compiles")
}

#[test]
fn combined_rule_numbers_the_lattice() {
    let mut template =
        compile("<?gen.begin count=3 context=combined ?>(<?gen.value order=context ?>)<?gen.end ?>");
    for parent in [0i64, 1, 5, 11] {
        let expected = format!("({})({})({})", parent * 3, parent * 3 + 1, parent * 3 + 2);
        assert_eq!(template.generate_to_string(parent).unwrap(), expected);
    }
}

#[test]
fn nested_rule_restarts_per_invocation() {
    let text = "<?gen.begin count=2 context=combined ?>\
                <?gen.begin count=2 context=nested ?>(<?gen.value order=context ?>)<?gen.end ?>\
                <?gen.end ?>";
    let mut template = compile(text);
    assert_eq!(template.generate_to_string(0).unwrap(), "(0)(1)(0)(1)");
}

#[test]
fn incremental_rule_never_resets() {
    let text = "<?gen.begin count=2 context=combined ?>\
                <?gen.begin count=2 context=incremental ?>(<?gen.value order=context ?>)<?gen.end ?>\
                <?gen.end ?>";
    let mut template = compile(text);
    assert_eq!(template.generate_to_string(0).unwrap(), "(0)(1)(2)(3)");
    // The counter carries across generate calls as well.
    assert_eq!(template.generate_to_string(0).unwrap(), "(4)(5)(6)(7)");
}

#[test]
fn random_iteration_count_stays_in_bounds() {
    let mut template = compile("<?gen.begin min=2 max=5 ?>x<?gen.end ?>");
    for _ in 0..100 {
        let len = template.generate_to_string(0).unwrap().len();
        assert!((2..=5).contains(&len), "{} iterations", len);
    }
}

#[test]
fn ratio_decay_bounds_and_mean() {
    let mut low = compile("<?gen.begin min=1 max=20 ratio=0.2 name=low ?>x<?gen.end ?>");
    let mut high = compile("<?gen.begin min=1 max=20 ratio=0.8 name=high ?>x<?gen.end ?>");
    let mut low_total = 0usize;
    let mut high_total = 0usize;
    for _ in 0..300 {
        let a = low.generate_to_string(0).unwrap().len();
        let b = high.generate_to_string(0).unwrap().len();
        assert!((1..=20).contains(&a));
        assert!((1..=20).contains(&b));
        low_total += a;
        high_total += b;
    }
    // Mean iteration count grows with the decay ratio: roughly 1/(1-r)
    // until the max cap bites.
    assert!(
        high_total > low_total,
        "ratio 0.8 mean ({}) should exceed ratio 0.2 mean ({})",
        high_total,
        low_total
    );
}

#[test]
fn while_condition_on_variables() {
    let text = "<?gen.variable source={flag=1} ?>\
                <?gen.begin count=1 while=$flag=1 ?>ON<?gen.end ?>";
    let mut template = compile(text);
    assert_eq!(template.generate_to_string(0).unwrap(), "ON");
    template.set_variables("{flag=0}");
    assert_eq!(template.generate_to_string(0).unwrap(), "");
}

#[test]
fn constant_conditions_fold() {
    let mut kept = compile("<?gen.begin count=2 while=1<2 ?>y<?gen.end ?>");
    assert_eq!(kept.generate_to_string(0).unwrap(), "yy");
    let mut dropped = compile("<?gen.begin count=2 while=2<1 ?>y<?gen.end ?>");
    assert_eq!(dropped.generate_to_string(0).unwrap(), "");
}

#[test]
fn ambiguous_condition_defaults_to_true() {
    let mut template = compile("<?gen.begin count=1 while=notanexpression ?>kept<?gen.end ?>");
    assert_eq!(template.generate_to_string(0).unwrap(), "kept");
}

#[test]
fn count_dollar_variable_expansion() {
    let text = "<?gen.variable source={reps=4} ?>\
                <?gen.begin count=$reps ?>*<?gen.end ?>";
    let mut template = compile(text);
    assert_eq!(template.generate_to_string(0).unwrap(), "****");
}

#[test]
fn blocks_never_write_save_variables() {
    let text = "<?gen.begin count=2 save=blk ?>x<?gen.end ?><?gen.variable name=blk default=unset ?>";
    let mut template = compile(text);
    assert_eq!(template.generate_to_string(0).unwrap(), "xxunset");
}

#[test]
fn sibling_blocks_see_saved_variables_in_order() {
    // save= writes are visible to any segment later in the traversal.
    let text = "<?gen.begin count=1 ?><?gen.value order=context save=seen format=#0 ?><?gen.end ?>\
                |<?gen.variable name=seen ?>";
    let mut template = compile(text);
    assert_eq!(template.generate_to_string(4).unwrap(), "4|4");
}

#[test]
fn deep_nesting_generates() {
    // ~60 nested blocks, well past typical template depth.
    let mut text = String::new();
    for _ in 0..60 {
        text.push_str("<?gen.begin count=1 ?>");
    }
    text.push('.');
    for _ in 0..60 {
        text.push_str("<?gen.end ?>");
    }
    let mut template = compile(&text);
    assert_eq!(template.generate_to_string(0).unwrap(), ".");
}

#[test]
fn empty_block_emits_nothing() {
    let mut template = compile("a<?gen.begin count=5 ?><?gen.end ?>b");
    assert_eq!(template.generate_to_string(0).unwrap(), "ab");
}
