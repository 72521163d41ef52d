use hand_core::{Hand, WriteRequest};

const ESSAY: [&str; 34] = [
    "In an age where every idle moment is filled with scrolling,",
    "notifications, and endless content, boredom has become the enemy.",
    "We treat it like a bug in the system rather than a feature.",
    "Yet boredom is one of humanity's most underappreciated superpowers.",
    "",
    "When the mind is under-stimulated, it doesn't shut down - it rebels.",
    "It starts connecting ideas that seemed unrelated, daydreaming scenarios",
    "that have no immediate payoff, and asking questions we're usually too",
    "busy to entertain. Most great insights, inventions, and works of art",
    "began in moments of what looked like wasted time. Newton watched an",
    "apple fall because he had nothing better to do that afternoon.",
    "J.K. Rowling sketched the first ideas of Harry Potter on a delayed",
    "train with only a pen and boredom as companions.",
    "",
    "Modern life has engineered boredom out of existence. The average person",
    "checks their phone 150 times a day. We have perfected the art of",
    "distraction so thoroughly that silence feels uncomfortable, empty space",
    "feels wrong. But creativity abhors a vacuum only when the vacuum is",
    "feared. When we learn to sit with emptiness, the mind floods it with",
    "something new.",
    "",
    "Children understand this intuitively. Give a child a cardboard box and",
    "twenty uninterrupted minutes, and it becomes a spaceship, a castle, a",
    "time machine. Adults have simply forgotten the rules of the game:",
    "boredom is the price of admission to imagination.",
    "",
    "We don't need more stimuli; we need more gaps. The courage to be bored",
    "- to stare out a window, to walk without podcasts, to lie in bed",
    "without reaching for the phone - is the closest thing our",
    "over-scheduled brains have to a reset button.",
    "",
    "In the end, the most productive thing you can do is sometimes nothing",
    "at all. Let yourself be bored. Something interesting is trying to",
    "find you.",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Load the parameters (model.bin), the priming styles (styles/*.style)
    // and the optional settings (hand.json) from the "data" directory
    let hand = Hand::new("./data")?;
    println!("{} priming styles available", hand.styles().len());

    std::fs::create_dir_all("img")?;

    // Basic usage, primed with style 9 for a more consistent hand
    println!("Example 1: Basic handwriting");
    let request = WriteRequest::new(["Hello, world!", "This is simple handwriting."], 0.75, Some(9));
    hand.write("img/example1.svg", &request)?;

    // One style, colour and width per line
    println!("Example 2: Custom styles and colors");
    let request = WriteRequest {
        lines: vec![
            "Line 1 in style 0".to_owned(),
            "Line 2 in style 5".to_owned(),
            "Line 3 in style 9".to_owned(),
        ],
        biases: vec![0.75; 3],
        styles: Some(vec![Some(0), Some(5), Some(9)]),
        ..WriteRequest::default()
    }
    .with_colors(["red", "blue", "green"])
    .with_widths([1.0, 2.0, 3.0]);
    hand.write("img/example2.svg", &request)?;

    // The higher the bias, the neater the writing
    println!("Example 3: Different neatness levels");
    let mut request = WriteRequest::new(["Messy (bias 0.5)", "Normal (bias 0.75)", "Neat (bias 1.0)"], 0.0, Some(9));
    request.biases = vec![0.5, 0.75, 1.0];
    hand.write("img/example3.svg", &request)?;

    // Empty lines are kept as paragraph gaps
    println!("Example 4: Essay on boredom");
    let request = WriteRequest::new(ESSAY, 0.75, Some(5));
    hand.write("img/example4.svg", &request)?;

    // Requests are checked before anything is generated
    let invalid = WriteRequest::new(["Zebra"], 0.75, None);
    match hand.write("img/never.svg", &invalid) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected as expected: {e}"),
    }

    println!("\nAll examples saved to img/ directory!");
    Ok(())
}
