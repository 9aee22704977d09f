// ── Curated dynamic-scene catalog ──
//
// The cloud does not reliably enumerate every scene a light supports, so
// this built-in catalog is always available as a baseline. Scenes fetched
// live for a SKU are merged on top (same name wins).

/// `(name, scene id, param id)` triples understood by the firmware's
/// dynamic-scene capability.
pub(crate) const DEFAULT_SCENES: &[(&str, i64, i64)] = &[
    ("Sunrise", 196, 177),
    ("Sunset", 197, 178),
    ("Rainbow", 198, 179),
    ("Sunset Glow", 199, 180),
    ("Snow flake", 200, 181),
    ("Aurora", 201, 182),
    ("Forest", 202, 183),
    ("Ocean", 203, 184),
    ("Waves", 204, 185),
    ("Fire", 205, 186),
    ("Dark Clouds", 2457, 2565),
    ("Morning", 730, 784),
    ("Firefly", 2458, 2568),
    ("Sky", 731, 785),
    ("Flowing Light", 2459, 2569),
    ("Flower Field", 732, 786),
    ("Dense fog", 733, 787),
    ("Lightning", 734, 788),
    ("Falling Petals", 735, 789),
    ("Feather", 736, 790),
    ("Reading", 206, 187),
    ("Night Light", 207, 188),
    ("Fish tank", 208, 189),
    ("Graffiti", 209, 190),
    ("Cherry Blossom Festival", 210, 191),
    ("Eating Dots", 2460, 2570),
    ("Marshmallow", 2463, 2567),
    ("Goldfish", 737, 791),
    ("Geometry", 738, 792),
    ("Kaleidoscope", 739, 793),
    ("Rubik's Cube", 740, 794),
    ("Train", 741, 795),
    ("Kitchen Aromas", 742, 796),
    ("Rings", 743, 797),
    ("Dancing", 211, 192),
    ("Breathe", 212, 193),
    ("Gradient", 213, 194),
    ("Cheerful", 214, 195),
    ("Sweet", 215, 196),
    ("Heartbeat", 2462, 2571),
    ("Leisure", 744, 798),
    ("Healing", 745, 799),
    ("Dreamland", 746, 800),
];
